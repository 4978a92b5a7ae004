//! International Securities Identification Numbers.

mod codec;
mod extractor;

pub use codec::{checksum_valid, is_normalized_form, normalize, Isin, ISIN_LEN};
pub use extractor::{
    display_or_undetermined, extract, from_document, from_file_name, from_path_name, UNDETERMINED,
};
