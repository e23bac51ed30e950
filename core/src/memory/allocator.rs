//! Guest arena allocation for save icons

/// Allocation tag used for decoded save icons.
pub const ICON_ALLOC_TAG: &str = "SaveData Icon";

const ALIGN: u32 = 16;

/// Block allocator inside the emulated address space.
pub trait ArenaAllocator {
    /// Allocate `size` bytes, from the top of the arena if `from_top`.
    ///
    /// Returns the guest address, or `None` when no block fits.
    fn alloc(&mut self, size: u32, from_top: bool, tag: &str) -> Option<u32>;

    /// Free the block starting at `addr`. Returns false if no such block.
    fn free(&mut self, addr: u32) -> bool;
}

/// Exclusively owned icon block in the guest arena.
///
/// Not `Clone`: exactly one owner exists, and the block goes back to the
/// allocator through [`IconAllocation::release`].
#[derive(Debug, PartialEq, Eq)]
#[must_use = "icon allocations must be released back to the allocator"]
pub struct IconAllocation {
    addr: u32,
    size: u32,
}

impl IconAllocation {
    /// Allocate a top-down block of `size` bytes tagged for icon use.
    pub fn allocate<A: ArenaAllocator + ?Sized>(allocator: &mut A, size: u32) -> Option<Self> {
        let addr = allocator.alloc(size, true, ICON_ALLOC_TAG)?;
        Some(Self { addr, size })
    }

    pub fn addr(&self) -> u32 {
        self.addr
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn release<A: ArenaAllocator + ?Sized>(self, allocator: &mut A) {
        if !allocator.free(self.addr) {
            tracing::warn!(addr = self.addr, "icon allocation was not known to the allocator");
        }
    }
}

#[derive(Debug, Clone)]
struct Block {
    start: u32,
    size: u32,
    tag: String,
}

impl Block {
    fn end(&self) -> u32 {
        self.start + self.size
    }
}

/// First-fit allocator over a fixed guest address range.
#[derive(Debug)]
pub struct BlockAllocator {
    base: u32,
    end: u32,
    /// Sorted by start address.
    blocks: Vec<Block>,
}

impl BlockAllocator {
    pub fn new(base: u32, size: u32) -> Self {
        Self {
            base,
            end: base.saturating_add(size),
            blocks: Vec::new(),
        }
    }

    /// Number of live blocks.
    pub fn live_blocks(&self) -> usize {
        self.blocks.len()
    }

    /// Bytes currently handed out.
    pub fn used_bytes(&self) -> u64 {
        self.blocks.iter().map(|b| b.size as u64).sum()
    }

    /// Tag of the block at `addr`, if allocated.
    pub fn tag_of(&self, addr: u32) -> Option<&str> {
        self.blocks
            .iter()
            .find(|b| b.start == addr)
            .map(|b| b.tag.as_str())
    }

    /// Free gaps as (start, end) in ascending order.
    fn gaps(&self) -> Vec<(u32, u32)> {
        let mut gaps = Vec::with_capacity(self.blocks.len() + 1);
        let mut cursor = self.base;
        for block in &self.blocks {
            if block.start > cursor {
                gaps.push((cursor, block.start));
            }
            cursor = block.end();
        }
        if self.end > cursor {
            gaps.push((cursor, self.end));
        }
        gaps
    }
}

fn align_up(v: u32, align: u32) -> Option<u32> {
    v.checked_add(align - 1).map(|v| v & !(align - 1))
}

impl ArenaAllocator for BlockAllocator {
    fn alloc(&mut self, size: u32, from_top: bool, tag: &str) -> Option<u32> {
        if size == 0 {
            return None;
        }
        let size = align_up(size, ALIGN)?;
        let gaps = self.gaps();

        let start = if from_top {
            gaps.iter().rev().find_map(|&(lo, hi)| {
                let start = hi.checked_sub(size)? & !(ALIGN - 1);
                (start >= lo).then_some(start)
            })
        } else {
            gaps.iter().find_map(|&(lo, hi)| {
                let start = align_up(lo, ALIGN)?;
                (start.checked_add(size)? <= hi).then_some(start)
            })
        }?;

        let pos = self.blocks.partition_point(|b| b.start < start);
        self.blocks.insert(
            pos,
            Block {
                start,
                size,
                tag: tag.to_string(),
            },
        );
        Some(start)
    }

    fn free(&mut self, addr: u32) -> bool {
        match self.blocks.iter().position(|b| b.start == addr) {
            Some(i) => {
                self.blocks.remove(i);
                true
            }
            None => false,
        }
    }
}
