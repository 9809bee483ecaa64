//! Synthetic image construction, mkfs-style.
//!
//! The images mirror the classic teaching layout: 1024 blocks of 512
//! bytes, 200 inodes. The inode table spans blocks 2..27, the bitmap
//! is block 27, and the data region starts at block 28. `mkfs` builds
//! a pristine image holding only the root directory; tests perturb it.

#![allow(dead_code)]

use xcheck::fs::{Dinode, Dirent, Superblock, BSIZE, DIRENT_SIZE, NDIRECT};
use zerocopy::IntoBytes;

pub const FSSIZE: u32 = 1024;
pub const NINODES: u32 = 200;
pub const BMAP: u32 = 27;
pub const DATA: u32 = 28;
pub const NBLOCKS: u32 = FSSIZE - DATA;

pub const T_DIR: u16 = 1;
pub const T_FILE: u16 = 2;

/// A well-formed image containing only the root directory.
pub fn mkfs() -> Vec<u8> {
    let mut img = vec![0u8; FSSIZE as usize * BSIZE];

    let sb = Superblock::new(FSSIZE, NBLOCKS, NINODES);
    img[BSIZE..BSIZE + sb.as_bytes().len()].copy_from_slice(sb.as_bytes());

    // Root directory: inode 1, "." and ".." in the first data block.
    let root = Dinode::new(T_DIR, 1, 2 * DIRENT_SIZE as u32, daddrs(&[DATA]), 0);
    put_inode(&mut img, 1, &root);
    put_dirent(&mut img, DATA, 0, &Dirent::new(1, b"."));
    put_dirent(&mut img, DATA, 1, &Dirent::new(1, b".."));

    // Boot, superblock, inode table, bitmap, and the root's block are
    // all allocated.
    for block in 0..=DATA {
        set_bit(&mut img, block);
    }
    img
}

/// Pad a short address list out to a full direct-slot array.
pub fn daddrs(addrs: &[u32]) -> [u32; NDIRECT] {
    let mut out = [0; NDIRECT];
    out[..addrs.len()].copy_from_slice(addrs);
    out
}

pub fn put_inode(img: &mut [u8], inum: u32, ip: &Dinode) {
    let off = 2 * BSIZE + inum as usize * ip.as_bytes().len();
    img[off..off + ip.as_bytes().len()].copy_from_slice(ip.as_bytes());
}

pub fn put_dirent(img: &mut [u8], block: u32, slot: usize, de: &Dirent) {
    let off = block as usize * BSIZE + slot * DIRENT_SIZE;
    img[off..off + DIRENT_SIZE].copy_from_slice(de.as_bytes());
}

/// Fill an indirect block with the given addresses.
pub fn put_indirect(img: &mut [u8], block: u32, entries: &[u32]) {
    for (i, addr) in entries.iter().enumerate() {
        let off = block as usize * BSIZE + i * 4;
        img[off..off + 4].copy_from_slice(&addr.to_le_bytes());
    }
}

pub fn set_bit(img: &mut [u8], block: u32) {
    img[BMAP as usize * BSIZE + block as usize / 8] |= 1 << (block % 8);
}

pub fn clear_bit(img: &mut [u8], block: u32) {
    img[BMAP as usize * BSIZE + block as usize / 8] &= !(1 << (block % 8));
}
