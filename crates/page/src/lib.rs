pub mod clipboard;
pub mod page;
#[cfg(feature = "native")]
pub mod static_page;

pub use clipboard::{AsyncSupport, Clipboard, ClipboardError, ClipboardWrite, MemoryClipboard, copy_text};
pub use page::{DomError, Location, NodeId, Page, Rect, click_element, is_visible};
#[cfg(feature = "native")]
pub use static_page::{PageEvent, StaticPage};
