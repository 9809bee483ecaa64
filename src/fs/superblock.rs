use std::mem;

use static_assertions::const_assert_eq;
use zerocopy::byteorder::little_endian::U32;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use super::{Dinode, BSIZE};

/// The super block describes the disk layout:
/// [ boot block | super block | inode blocks | free bit map | data blocks ]
///
/// This xv6 variant predates the log; the superblock carries only the
/// three counters below, so the bitmap and data offsets are derived
/// from `ninodes` rather than read from dedicated fields.
#[repr(C)]
#[derive(Debug, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
pub struct Superblock {
    /// Size of file system image (blocks)
    size: U32,

    /// Number of data blocks
    nblocks: U32,

    /// Number of inodes
    ninodes: U32,
}

/// Inodes per block.
pub const IPB: usize = BSIZE / mem::size_of::<Dinode>();

/// Bitmap bits per block
pub const BPB: usize = BSIZE * 8;

const_assert_eq!(mem::size_of::<Superblock>(), 12);
const_assert_eq!(IPB, 8);

impl Superblock {
    pub fn new(size: u32, nblocks: u32, ninodes: u32) -> Superblock {
        Superblock {
            size: U32::new(size),
            nblocks: U32::new(nblocks),
            ninodes: U32::new(ninodes),
        }
    }

    /// Size of the file system image in blocks.
    pub fn size(&self) -> u32 {
        self.size.get()
    }

    /// Number of data blocks.
    pub fn nblocks(&self) -> u32 {
        self.nblocks.get()
    }

    /// Number of inodes in the table starting at block 2.
    pub fn ninodes(&self) -> u32 {
        self.ninodes.get()
    }

    /// Block of the free bitmap, directly after the inode table.
    pub fn bmapstart(&self) -> u32 {
        2 + self.ninodes().div_ceil(IPB as u32)
    }

    /// First block of the data region.
    pub fn data_start(&self) -> u32 {
        self.bmapstart() + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bitmap_follows_the_inode_table() {
        // 200 inodes pack into 25 blocks: table 2..27, bitmap 27, data 28.
        let sb = Superblock::new(1024, 996, 200);
        assert_eq!(sb.bmapstart(), 27);
        assert_eq!(sb.data_start(), 28);
    }

    #[test]
    fn full_last_inode_block_is_not_padded() {
        // 16 inodes fill exactly two table blocks.
        let sb = Superblock::new(64, 59, 16);
        assert_eq!(sb.bmapstart(), 4);
        assert_eq!(sb.data_start(), 5);
    }

    #[test]
    fn fields_decode_little_endian() {
        let mut bytes = [0u8; 12];
        bytes[..4].copy_from_slice(&1024u32.to_le_bytes());
        bytes[4..8].copy_from_slice(&996u32.to_le_bytes());
        bytes[8..].copy_from_slice(&200u32.to_le_bytes());
        let sb = Superblock::ref_from_bytes(&bytes).unwrap();
        assert_eq!(sb.size(), 1024);
        assert_eq!(sb.nblocks(), 996);
        assert_eq!(sb.ninodes(), 200);
    }
}
