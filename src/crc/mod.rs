use ::crc::{Crc, CRC_16_IBM_SDLC, CRC_32_ISCSI};

/// CRC16 used for TVM getter method ids
pub const CRC16: Crc<u16> = Crc::<u16>::new(&CRC_16_IBM_SDLC);

/// CRC32-C used by the Bag-of-Cells checksum
pub const CRC32C: Crc<u32> = Crc::<u32>::new(&CRC_32_ISCSI);
