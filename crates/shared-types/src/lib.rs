pub mod loose;
pub mod parse;
pub mod submission;
pub mod types;

pub use loose::{leading_int, loose_int};
pub use parse::{
    parse_annotation, parse_annotation_slice, parse_annotations, parse_span, AnnotationRejection,
    MAX_OFFSET,
};
pub use submission::{AnalysisPayload, CefrLevel, Rubric, Submission};
pub use types::{
    Annotation, AnnotationKind, ErrorAnnotation, ErrorSeverity, Segment, SegmentKind, Span,
};
