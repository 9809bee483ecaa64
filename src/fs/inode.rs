//! On-disk inodes and directory entries.
//!
//! An inode describes a single unnamed file: its type, size, link
//! count, and the list of blocks holding its content. Inodes are packed
//! sequentially on disk starting at block 2; an inode's number is its
//! position in that table. Inode 0 is reserved and inode 1 is the root
//! directory.
//!
//! A directory is a file containing a sequence of [`Dirent`]s.

use std::mem;

use static_assertions::const_assert_eq;
use zerocopy::byteorder::little_endian::{U16, U32};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use super::{BSIZE, NDIRECT};

/// Directory entry name length.
pub const DIRSIZ: usize = 14;

/// dirent size
pub const DIRENT_SIZE: usize = mem::size_of::<Dirent>();

/// Decoded inode type. Any other on-disk value marks a corrupt inode.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum InodeType {
    Free,
    Dir,
    File,
    Device,
}

/// On-disk inode structure
#[repr(C)]
#[derive(Debug, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
pub struct Dinode {
    /// File type
    typ: U16,

    /// Major device number (device files only)
    major: U16,

    /// Minor device number (device files only)
    minor: U16,

    /// Number of links to inode in file system
    nlink: U16,

    /// Size of file (bytes)
    size: U32,

    /// Direct data block addresses
    addr_direct: [U32; NDIRECT],

    /// Indirect data block address
    addr_indirect: U32,
}

const_assert_eq!(mem::size_of::<Dinode>(), 64);
const_assert_eq!(BSIZE % mem::size_of::<Dinode>(), 0);

impl Dinode {
    /// Assemble an inode record, mkfs-style. The checker itself only
    /// reads inodes; this is for image builders and tests.
    pub fn new(
        typ: u16,
        nlink: u16,
        size: u32,
        addr_direct: [u32; NDIRECT],
        addr_indirect: u32,
    ) -> Dinode {
        Dinode {
            typ: U16::new(typ),
            major: U16::new(0),
            minor: U16::new(0),
            nlink: U16::new(nlink),
            size: U32::new(size),
            addr_direct: addr_direct.map(U32::new),
            addr_indirect: U32::new(addr_indirect),
        }
    }

    /// Decoded type, or `None` for a value no xv6 inode can hold.
    pub fn typ(&self) -> Option<InodeType> {
        match self.typ.get() {
            0 => Some(InodeType::Free),
            1 => Some(InodeType::Dir),
            2 => Some(InodeType::File),
            3 => Some(InodeType::Device),
            _ => None,
        }
    }

    /// An inode is in use iff it holds a directory, file, or device.
    pub fn is_allocated(&self) -> bool {
        matches!(
            self.typ(),
            Some(InodeType::Dir | InodeType::File | InodeType::Device)
        )
    }

    pub fn major(&self) -> u16 {
        self.major.get()
    }

    pub fn minor(&self) -> u16 {
        self.minor.get()
    }

    pub fn nlink(&self) -> u16 {
        self.nlink.get()
    }

    pub fn size(&self) -> u32 {
        self.size.get()
    }

    /// The direct address slots as stored, zeros included.
    pub fn addr_direct(&self) -> &[U32; NDIRECT] {
        &self.addr_direct
    }

    pub fn addr_indirect(&self) -> u32 {
        self.addr_indirect.get()
    }

    /// Every address slot as stored, zeros included, indirect slot last.
    pub fn addr_slots(&self) -> impl Iterator<Item = u32> + '_ {
        self.addr_direct
            .iter()
            .chain(std::iter::once(&self.addr_indirect))
            .map(|a| a.get())
    }
}

/// A directory entry: an inode number and a NUL-padded name.
/// `inum == 0` marks a free entry.
#[repr(C)]
#[derive(Debug, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
pub struct Dirent {
    inum: U16,
    name: [u8; DIRSIZ],
}

const_assert_eq!(DIRENT_SIZE, 16);

impl Dirent {
    /// Fill in an entry. If `name` is shorter than `DIRSIZ` the rest is
    /// NUL padding; `name` must not itself contain NUL characters.
    pub fn new(inum: u16, name: &[u8]) -> Dirent {
        debug_assert!(name.len() <= DIRSIZ);
        let mut dirent = Dirent {
            inum: U16::new(inum),
            name: [0; DIRSIZ],
        };
        dirent.name[..name.len()].copy_from_slice(name);
        dirent
    }

    pub fn inum(&self) -> u16 {
        self.inum.get()
    }

    /// The name bytes up to the first NUL. Contains no NUL characters.
    pub fn name(&self) -> &[u8] {
        let len = self.name.iter().position(|ch| *ch == 0).unwrap_or(DIRSIZ);
        &self.name[..len]
    }
}

/// View a data block as the directory entries it holds. A full block
/// always divides evenly into entries.
pub fn dirents(block: &[u8]) -> &[Dirent] {
    <[Dirent]>::ref_from_bytes(block).unwrap_or_default()
}
