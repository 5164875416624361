// =============================================================================
// Bare Bones — Limine Boot Protocol Requests
// =============================================================================
//
// Limine scans the `.limine_requests` section of our ELF for these
// structures and fills in the responses before jumping to kmain().
// They must be `#[used]` or the linker will drop them as unreferenced.
//
// We only need one thing from the bootloader: the HHDM offset, i.e. the
// virtual address at which physical address 0 is mapped. The VGA text
// buffer is then at HHDM + 0xB8000.
// =============================================================================

use limine::BaseRevision;
use limine::request::HhdmRequest;

#[used]
#[unsafe(link_section = ".limine_requests")]
static BASE_REVISION: BaseRevision = BaseRevision::new();

#[used]
#[unsafe(link_section = ".limine_requests")]
static HHDM_REQUEST: HhdmRequest = HhdmRequest::new();

/// Did the bootloader accept the protocol revision we were built for?
pub fn base_revision_supported() -> bool {
    BASE_REVISION.is_supported()
}

/// Virtual offset of the higher-half direct map, if Limine provided one.
pub fn hhdm_offset() -> Option<u64> {
    HHDM_REQUEST.get_response().map(|response| response.offset())
}
