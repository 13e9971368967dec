//! VDJEdit 建立元件
//!
//! 將同名的音訊與影片配對，估計偏移後輸出 VirtualDJ 的 .vdjedit 描述檔

mod descriptor;
mod main;

pub use descriptor::{
    EditDescriptor, EmitOutcome, NEGATIVE_SUFFIX, SUBSTANDARD_SUFFIX, VDJEDIT_EXTENSION,
    base_output_file_name, compute_overlap_length, create_vdjedit, output_file_name,
};
pub use main::{RunOptions, RunSummary, VdjEditCreator};
