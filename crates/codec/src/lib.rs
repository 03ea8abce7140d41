//! Value codec for tensorbridge
//!
//! Converts between the host's dynamic [`HostValue`] and the engine's
//! [`TaggedValue`].
//!
//! Conversion into the engine is driven by the tag the method signature
//! declares for a position, not by the host value's own kind: the same host
//! number becomes a truncated integer in an `Int` slot and stays a float in a
//! `Double` slot.
//!
//! ## Conversion Rules
//!
//! | Tag | Accepted host kinds |
//! |-----|---------------------|
//! | None | Null |
//! | Tensor | Tensor |
//! | String | String |
//! | Double | Float, Int, numeric Scalar |
//! | Int | Int, finite Float (truncated), numeric Scalar |
//! | Bool | Bool, bool Scalar |
//! | ListBool / ListInt / ListDouble | Array of the element kind |
//! | ListTensor | Array of Tensor |
//! | ListOptionalTensor | Array of Tensor or Null |
//! | ListScalar | unsupported |
//!
//! ## Examples
//!
//! ```
//! use tensorbridge_codec::{from_tagged, to_tagged};
//! use tensorbridge_core::{HostValue, Tag, TaggedValue};
//!
//! let tagged = to_tagged(&HostValue::Float(3.9), Tag::Int).unwrap();
//! assert_eq!(tagged, TaggedValue::Int(3));
//!
//! let host = from_tagged(&TaggedValue::Double(0.5)).unwrap();
//! assert_eq!(host, HostValue::Float(0.5));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod decode;
pub mod encode;

pub use decode::{from_optional, from_tagged, from_tagged_list};
pub use encode::{to_tagged, to_tagged_optional};
