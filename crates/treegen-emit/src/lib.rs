/*! Turn compressed decision trees into Java source.
 *
 * A tree is walked once, depth first, and written as a single nested ternary
 * expression. The target compiler caps the size of a class, so the emitter
 * keeps a running estimate of each class and, once it is over budget, moves the
 * rest of the current subtree into a sibling class reached through a forward
 * call. Group splits become static byte-array fields on the class that tests
 * them.
 */

pub mod buffer;
pub mod config;
pub mod emitter;
pub mod error;
pub mod frame;
pub mod output;
pub(crate) mod shape;
pub mod sink;

pub use buffer::{java_float, FrameBuffer};
pub use config::{EmitterConfig, IndentStyle, Limits};
pub use emitter::{BuildSummary, EmitVisitor, TreeEmitter};
pub use error::{EmitError, EmitResult};
pub use frame::EmitFrame;
pub use output::{missing_entry_methods, render_json, JavaRenderer, OutputFormat, RenderOptions};
pub use sink::{
    ClassContainer, ClassSink, ClassSpec, FieldSpec, MethodSpec, SinkEvent, StagedSink,
    ENTRY_METHOD,
};
