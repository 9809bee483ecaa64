//! Enumeration of the block addresses an inode references.
//!
//! A file's content lives in the blocks named by its direct slots and,
//! past `NDIRECT * BSIZE` bytes, in the blocks named by its indirect
//! block. The walker yields the addresses in that order, with the
//! indirect block's own address between the two groups, and reads the
//! indirect block only as far as the file's logical extent.

use std::slice;

use zerocopy::byteorder::little_endian::U32;
use zerocopy::FromBytes;

use super::{Dinode, FsImage, BSIZE, NDIRECT, NINDIRECT};

/// Number of indirect-block entries the file's logical extent covers,
/// capped at the block's capacity. Zero when the file fits in its
/// direct slots.
pub fn indirect_count(ip: &Dinode) -> usize {
    let tail = ip.size().saturating_sub((NDIRECT * BSIZE) as u32);
    (tail.div_ceil(BSIZE as u32) as usize).min(NINDIRECT)
}

/// Iterator over every block address an inode references: non-zero
/// direct slots, then the indirect block's own address, then the
/// non-zero indirect entries within the file's extent.
pub struct BlockRefs<'a> {
    direct: slice::Iter<'a, U32>,
    indirect: Option<u32>,
    entries: slice::Iter<'a, U32>,
}

impl<'a> Iterator for BlockRefs<'a> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        for addr in self.direct.by_ref() {
            if addr.get() != 0 {
                return Some(addr.get());
            }
        }
        if let Some(addr) = self.indirect.take() {
            return Some(addr);
        }
        for addr in self.entries.by_ref() {
            if addr.get() != 0 {
                return Some(addr.get());
            }
        }
        None
    }
}

impl<'a> FsImage<'a> {
    /// Walk every block address `ip` references.
    pub fn block_refs(&self, ip: &'a Dinode) -> BlockRefs<'a> {
        let indirect = ip.addr_indirect();
        BlockRefs {
            direct: ip.addr_direct().iter(),
            indirect: (indirect != 0).then_some(indirect),
            entries: self.indirect_entries(ip).iter(),
        }
    }

    /// The indirect block's entries within `ip`'s logical extent, zeros
    /// included. Empty when no indirect block is allocated or it lies
    /// outside the image.
    pub fn indirect_entries(&self, ip: &'a Dinode) -> &'a [U32] {
        if ip.addr_indirect() == 0 {
            return &[];
        }
        let Some(block) = self.block(ip.addr_indirect()) else {
            return &[];
        };
        let entries = <[U32]>::ref_from_bytes(block).unwrap_or_default();
        &entries[..indirect_count(ip).min(entries.len())]
    }
}
