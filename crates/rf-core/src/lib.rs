pub mod cancel;
pub mod error;
pub mod eval;
pub mod index;
pub mod locate;
pub mod membership;
pub mod output;
pub mod range;
pub mod trim;

pub use cancel::CancelToken;
pub use error::{CoreError, CoreReason, CoreResult};
pub use eval::{HopCall, SlideCall, WindowFn, hop_over, slide_over};
pub use index::{IndexKind, IndexSequence};
pub use locate::{CompactRange, Cursor, locate_window};
pub use membership::MembershipTable;
pub use output::{OutputColumn, OutputKind};
pub use range::RangeBounds;
