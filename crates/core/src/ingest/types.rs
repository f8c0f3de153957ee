//! Upload pipeline inputs and outputs.

use crate::contract::ContractRecord;
use crate::file::FileRecord;

/// One incoming upload, as received from the HTTP layer.
#[derive(Debug, Clone)]
pub struct UploadCommand {
    /// Client-supplied filename. Overrides the multipart filename when
    /// the caller sends an explicit one.
    pub original_name: String,
    /// Type tag wire form (`"1"` or `"2"`).
    pub type_tag: String,
    /// Owning company id.
    pub company_id: String,
    /// Raw file bytes.
    pub content: Vec<u8>,
}

/// Skeletal contract created automatically for a contract-document upload.
///
/// All business fields start empty; the user fills them in later.
#[derive(Debug, Clone)]
pub struct NewLinkedContract {
    /// Linked file id.
    pub file_id: String,
    /// Owning company id.
    pub company_id: String,
    /// Cached path of the linked file.
    pub file_path: String,
    /// Cached original name of the linked file.
    pub file_name: String,
}

/// What the pipeline produced for one upload.
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    /// The persisted file record.
    pub file: FileRecord,
    /// The auto-created contract, for type tag `"1"` when creation
    /// succeeded.
    pub contract: Option<ContractRecord>,
    /// Id of an earlier file with identical content, informational only.
    pub duplicate_of: Option<String>,
}
