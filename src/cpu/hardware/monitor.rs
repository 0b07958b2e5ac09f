//! Exclusive-access monitor interface and a single-core reference monitor.

/// The two-level reservation store behind LDREX/STREX, plus the address
/// translation and shareability queries the synchronization instructions
/// need. In a multi-core simulation this is the only cross-core shared
/// structure; the implementation serializes the calls below.
pub trait ExclusiveMonitor {
    fn mark_exclusive_local(&mut self, physical_address: u32, processor_id: usize, size: u32);
    fn mark_exclusive_global(&mut self, physical_address: u32, processor_id: usize, size: u32);
    fn is_exclusive_local(&mut self, physical_address: u32, processor_id: usize, size: u32) -> bool;
    fn is_exclusive_global(&mut self, physical_address: u32, processor_id: usize, size: u32)
    -> bool;
    fn clear_exclusive_local(&mut self, processor_id: usize);
    /// Drops every reservation overlapping the given region, local and
    /// global, on every processor except `processor_id`'s local one.
    fn clear_exclusive_by_address(&mut self, physical_address: u32, processor_id: usize, size: u32);
    /// Virtual-to-physical translation used to key reservations.
    fn tlb(&mut self, virtual_address: u32) -> u32;
    /// Whether the address is in a shareable region (global monitor applies).
    fn shared(&mut self, virtual_address: u32) -> bool;
    /// Identifier of the processor executing the current instruction.
    fn executing_processor(&mut self) -> usize;
}

/// Reference monitor for a single simulated core.
///
/// Translation is the identity and shareability is a single configurable
/// switch. Reservations are kept as one `(address, size)` pair per level,
/// which is all one core can hold.
pub struct SingleCoreMonitor {
    /// Treat every address as shareable. Defaults to false.
    pub all_shared: bool,
    local: Option<(u32, u32)>,
    global: Option<(u32, u32)>,
}

impl SingleCoreMonitor {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            all_shared: false,
            local: None,
            global: None,
        }
    }

    #[must_use]
    pub const fn shared(mut self) -> Self {
        self.all_shared = true;
        self
    }
}

impl Default for SingleCoreMonitor {
    fn default() -> Self {
        Self::new()
    }
}

const fn overlaps(reservation: (u32, u32), address: u32, size: u32) -> bool {
    let (res_addr, res_size) = reservation;
    res_addr < address.wrapping_add(size) && address < res_addr.wrapping_add(res_size)
}

impl ExclusiveMonitor for SingleCoreMonitor {
    fn mark_exclusive_local(&mut self, physical_address: u32, _processor_id: usize, size: u32) {
        self.local = Some((physical_address, size));
    }

    fn mark_exclusive_global(&mut self, physical_address: u32, _processor_id: usize, size: u32) {
        self.global = Some((physical_address, size));
    }

    fn is_exclusive_local(
        &mut self,
        physical_address: u32,
        _processor_id: usize,
        size: u32,
    ) -> bool {
        self.local
            .is_some_and(|held| overlaps(held, physical_address, size))
    }

    fn is_exclusive_global(
        &mut self,
        physical_address: u32,
        _processor_id: usize,
        size: u32,
    ) -> bool {
        self.global
            .is_some_and(|held| overlaps(held, physical_address, size))
    }

    fn clear_exclusive_local(&mut self, _processor_id: usize) {
        self.local = None;
    }

    fn clear_exclusive_by_address(&mut self, physical_address: u32, _processor_id: usize, size: u32) {
        if self
            .global
            .is_some_and(|held| overlaps(held, physical_address, size))
        {
            self.global = None;
        }
    }

    fn tlb(&mut self, virtual_address: u32) -> u32 {
        virtual_address
    }

    fn shared(&mut self, _virtual_address: u32) -> bool {
        self.all_shared
    }

    fn executing_processor(&mut self) -> usize {
        0
    }
}
