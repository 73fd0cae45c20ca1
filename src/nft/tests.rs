//! Integration tests across the message protocol

use crate::content::decode_content;
use crate::nft::batch::BatchEntry;
use crate::nft::collection::{MintParams, RoyaltyParams, mint_body};
use crate::nft::ops;
use crate::nft::request::{ITEM_STORAGE_AMOUNT, batch_mint_request, mint_request};
use crate::tvm::*;

fn test_address(fill: u8) -> Address {
    Address::new(0, [fill; 32])
}

#[test]
fn test_mint_body_over_the_wire() {
    let _ = crate::utils::init_logger();

    // Build, serialize to BoC, deserialize, and decode every field back
    let owner = test_address(7);
    let body = mint_body(&MintParams {
        query_id: 42,
        item_index: 3,
        coins_for_storage: ITEM_STORAGE_AMOUNT,
        owner: owner.clone(),
        content: "/nft.json".to_string(),
    })
    .unwrap();

    let wire = serialize_boc(&body, true).unwrap();
    let decoded = deserialize_boc(&wire).unwrap();
    assert_eq!(body.hash(), decoded.hash());

    let mut slice = Slice::new(decoded);
    assert_eq!(slice.load_u32().unwrap(), ops::MINT);
    assert_eq!(slice.load_u64().unwrap(), 42);
    assert_eq!(slice.load_u64().unwrap(), 3);
    assert_eq!(slice.load_coins().unwrap(), ITEM_STORAGE_AMOUNT);

    let mut item = Slice::new(slice.load_reference().unwrap());
    assert_eq!(item.load_address().unwrap(), Some(owner));
    let content = item.load_reference().unwrap();
    assert_eq!(decode_content(&content).unwrap(), "/nft.json");
}

#[test]
fn test_batch_mint_over_the_wire() {
    // A batch whose dictionary spans well over 256 cells exercises wide
    // reference indices in the BoC
    let entries: Vec<BatchEntry> = (0..80)
        .map(|i| {
            BatchEntry::for_owner(i, ITEM_STORAGE_AMOUNT, &test_address(i as u8), "/nft.json")
                .unwrap()
        })
        .collect();

    let request = batch_mint_request(&test_address(1), 0, &entries, 1_700_000_600).unwrap();
    let payload = request.messages[0].payload.as_ref().unwrap();
    let body = base64_to_boc(payload).unwrap();

    let mut slice = Slice::new(body);
    assert_eq!(slice.load_u32().unwrap(), ops::BATCH_MINT);
    assert_eq!(slice.load_u64().unwrap(), 0);
    assert!(slice.load_bit().unwrap());

    let dict = Dict::parse(&slice.load_reference().unwrap(), 64).unwrap();
    assert_eq!(dict.len(), 80);

    let mut value = Slice::new(dict.get(79).unwrap().clone());
    assert_eq!(value.load_coins().unwrap(), ITEM_STORAGE_AMOUNT);
    let mut item = Slice::new(value.load_reference().unwrap());
    assert_eq!(item.load_address().unwrap(), Some(test_address(79)));
}

#[test]
fn test_royalty_flow() {
    // The royalty params used to list an item feed the sale's fee record
    let royalty = RoyaltyParams {
        factor: 10,
        base: 100,
        address: test_address(5),
    };
    let price: u128 = 100_000_000_000;
    let royalty_amount = royalty.royalty_amount(price);
    assert_eq!(royalty_amount, 10_000_000_000);

    let mut slice = Slice::new(royalty.to_cell().unwrap());
    assert_eq!(slice.load_u16().unwrap(), 10);
    assert_eq!(slice.load_u16().unwrap(), 100);
    assert_eq!(slice.load_address().unwrap(), Some(test_address(5)));
}

#[test]
fn test_mint_request_roundtrips_owner() {
    let owner = test_address(9);
    let params = MintParams {
        query_id: 0,
        item_index: 0,
        coins_for_storage: ITEM_STORAGE_AMOUNT,
        owner: owner.clone(),
        content: "/nft.json".to_string(),
    };

    let request = mint_request(&test_address(1), &params, 100_000_000, 1_700_000_600).unwrap();
    let body = base64_to_boc(request.messages[0].payload.as_ref().unwrap()).unwrap();

    let mut slice = Slice::new(body);
    assert_eq!(slice.load_u32().unwrap(), 1);
    slice.skip_bits(64 + 64).unwrap();
    slice.load_coins().unwrap();

    let mut item = Slice::new(slice.load_reference().unwrap());
    assert_eq!(item.load_address().unwrap(), Some(owner));
}
