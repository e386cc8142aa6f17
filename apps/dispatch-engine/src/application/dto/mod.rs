//! Data Transfer Objects (DTOs)
//!
//! Inputs and outputs of the dispatch use cases.

mod dispatch_dto;
mod master_dto;

pub use dispatch_dto::{
    DispatchPreview, DispatchRequest, DispatchResult, MarginFailure, PreviewRow, PreviewTotals,
};
pub use master_dto::{CancelMasterResult, CancelOutcome, MasterView};
