pub mod identifications;
pub mod run;

pub use identifications::{
    IdentificationFormat,
    IdentificationRecord,
    LabelDefinition,
    LabelSet,
    read_identifications,
};
pub use run::{
    InMemoryRun,
    RunFile,
    RunFormat,
    ScanRecord,
};
