//! On-disk file-system format and the decoded image view.
//!
//! Disk layout:
//! [ boot block | super block | inode blocks | free bit map | data blocks ]
//!
//! The superblock sits in block 1 and the inode table starts at block 2.
//! The free bitmap occupies the single block after the inode table, one
//! bit per block of the image, and the data region follows it.
//!
//! [`FsImage`] bundles the raw bytes with the decoded superblock and
//! projects blocks, inodes, and bitmap bits out of them by index. It
//! performs no validation beyond bounds; interpreting what the views
//! mean is the checker's job.

use std::mem;

use log::debug;
use thiserror::Error;
use zerocopy::FromBytes;

mod inode;
mod superblock;
pub mod walk;

pub use inode::{dirents, Dinode, Dirent, InodeType, DIRENT_SIZE, DIRSIZ};
pub use superblock::{Superblock, BPB, IPB};
pub use walk::BlockRefs;

/// block size
pub const BSIZE: usize = 512;

/// root i-number
pub const ROOTINO: u32 = 1;

/// Direct address slots per inode.
pub const NDIRECT: usize = 12;

/// Addresses held by one indirect block.
pub const NINDIRECT: usize = BSIZE / mem::size_of::<u32>();

/// The image cannot hold a superblock.
#[derive(Debug, Error)]
#[error("ERROR: image too small for a superblock")]
pub struct TruncatedImage;

/// Decoded view of a mapped image: the raw bytes plus the superblock.
/// Constructed once at startup and read-only thereafter; every check
/// receives it by reference.
pub struct FsImage<'a> {
    data: &'a [u8],
    sb: &'a Superblock,
}

impl<'a> FsImage<'a> {
    /// Decode the superblock and wrap `data` for block-indexed access.
    pub fn new(data: &'a [u8]) -> Result<FsImage<'a>, TruncatedImage> {
        let block = data.get(BSIZE..2 * BSIZE).ok_or(TruncatedImage)?;
        let (sb, _) = Superblock::ref_from_prefix(block).map_err(|_| TruncatedImage)?;
        debug!(
            "image: {} blocks, {} data blocks, {} inodes, bitmap at block {}",
            sb.size(),
            sb.nblocks(),
            sb.ninodes(),
            sb.bmapstart(),
        );
        Ok(FsImage { data, sb })
    }

    pub fn superblock(&self) -> &'a Superblock {
        self.sb
    }

    /// The `BSIZE` bytes of block `i`, or `None` past the end of the image.
    pub fn block(&self, i: u32) -> Option<&'a [u8]> {
        let off = (i as usize).checked_mul(BSIZE)?;
        self.data.get(off..off.checked_add(BSIZE)?)
    }

    /// Inode `n` of the table, decoded in place.
    pub fn dinode(&self, n: u32) -> Option<&'a Dinode> {
        let off = (2 * BSIZE).checked_add((n as usize).checked_mul(mem::size_of::<Dinode>())?)?;
        let bytes = self.data.get(off..off.checked_add(mem::size_of::<Dinode>())?)?;
        Dinode::ref_from_bytes(bytes).ok()
    }

    /// Every `(inum, inode)` of the table, in inode order.
    pub fn inodes(&self) -> impl Iterator<Item = (u32, &'a Dinode)> + '_ {
        (0..self.sb.ninodes()).filter_map(move |n| Some((n, self.dinode(n)?)))
    }

    /// The bitmap bit for block `k`, LSB-first within each byte.
    /// Out-of-range indices read as 0.
    pub fn bitmap_bit(&self, k: u32) -> u8 {
        let Some(bmap) = self.block(self.sb.bmapstart()) else {
            return 0;
        };
        let byte = k as usize / 8;
        if byte >= bmap.len() {
            return 0;
        }
        (bmap[byte] >> (k % 8)) & 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zerocopy::IntoBytes;

    // A toy image: 8 blocks, 8 inodes (one table block), bitmap at
    // block 3, data blocks 4..8.
    fn toy_image() -> Vec<u8> {
        let mut data = vec![0u8; 8 * BSIZE];
        let sb = Superblock::new(8, 4, 8);
        data[BSIZE..BSIZE + mem::size_of::<Superblock>()].copy_from_slice(sb.as_bytes());
        data
    }

    #[test]
    fn rejects_an_image_without_a_superblock() {
        assert!(FsImage::new(&[0u8; BSIZE]).is_err());
        assert!(FsImage::new(&toy_image()).is_ok());
    }

    #[test]
    fn bitmap_bits_are_lsb_first() {
        let mut data = toy_image();
        data[3 * BSIZE] = 0b0001_0001;
        let img = FsImage::new(&data).unwrap();
        assert_eq!(img.bitmap_bit(0), 1);
        assert_eq!(img.bitmap_bit(1), 0);
        assert_eq!(img.bitmap_bit(4), 1);
        assert_eq!(img.bitmap_bit(5), 0);
    }

    #[test]
    fn out_of_range_bitmap_bits_read_as_zero() {
        let mut data = toy_image();
        data[3 * BSIZE..4 * BSIZE].fill(0xff);
        let img = FsImage::new(&data).unwrap();
        assert_eq!(img.bitmap_bit(BSIZE as u32 * 8 - 1), 1);
        assert_eq!(img.bitmap_bit(BSIZE as u32 * 8), 0);
        assert_eq!(img.bitmap_bit(u32::MAX), 0);
    }

    #[test]
    fn blocks_past_the_mapping_are_absent() {
        let data = toy_image();
        let img = FsImage::new(&data).unwrap();
        assert!(img.block(7).is_some());
        assert!(img.block(8).is_none());
        assert!(img.block(u32::MAX).is_none());
    }
}
