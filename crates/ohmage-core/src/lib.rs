//! # ohmage Core
//!
//! The deterministic logic behind the ohmage data-collection client.
//!
//! ## Modules
//!
//! - [`condition`]: the survey condition language. A sentence such as
//!   `"mood >= 5 and smoker = true"` is parsed into a tree of [`Fragment`]s
//!   and evaluated against recorded [`Responses`].
//! - [`survey`]: item definitions and show/hide logic driven by conditions.
//! - [`stream`]: locally buffered stream data waiting to be uploaded.
//! - [`storage`]: the embedded (redb) upload buffer.
//! - [`formats`]: the binary record format used by the buffer.
//!
//! ## Constraints
//!
//! - No async, no network: the app layer owns I/O and scheduling.
//! - `BTreeMap` everywhere for deterministic iteration.
//! - Malformed conditions fail when they are built, never when evaluated.

pub mod condition;
pub mod error;
pub mod formats;
pub mod primitives;
pub mod storage;
pub mod stream;
pub mod survey;

pub use condition::{
    BuildError, Comparator, ComparatorBuilder, ConditionError, Conjunction, Fragment, FragmentBuilder,
    Junction, Relation, Terminal, Token,
};
pub use error::{CoreError, Result};
pub use primitives::{ItemId, Responses, Value};
pub use storage::{MemoryBuffer, RedbBuffer, StreamBuffer};
pub use stream::{StreamId, StreamRecord};
pub use survey::{
    Choice, CompiledItem, CompiledSurvey, ItemDefinition, ItemDefinitions, ItemKind, Survey,
    SurveyError,
};
