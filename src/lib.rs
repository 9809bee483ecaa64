//! Offline consistency checker for xv6-style file-system images.
//!
//! An image is a boot block, a superblock, a packed inode table, a
//! free-block bitmap, and a region of data blocks (see [`fs`]). The
//! checker maps the image read-only, decodes it in place, and runs a
//! fixed sequence of structural checks over the decoded view; the first
//! violation is the verdict.
//!
//! Nothing here modifies an image. Every typed view borrows into the
//! mapped bytes for the life of the program.

pub mod check;
pub mod fs;
pub mod image;
