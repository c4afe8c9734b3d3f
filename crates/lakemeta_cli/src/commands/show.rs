//! Show command implementation.

use super::{is_json, CmdResult};
use lakemeta_core::{TabletId, TabletManager, TabletMetadata, Version};

/// Runs the show command.
pub fn run(manager: &TabletManager, tablet: u64, version: u64, format: &str) -> CmdResult {
    let metadata = manager.get_tablet_metadata(TabletId::new(tablet), Version::new(version))?;

    if is_json(format) {
        println!("{}", serde_json::to_string_pretty(&*metadata)?);
    } else {
        print_text_output(&metadata);
    }
    Ok(())
}

fn print_text_output(metadata: &TabletMetadata) {
    println!("{} {}", metadata.id, metadata.version);
    println!("  Schema:          {}", metadata.schema.id);
    println!("  Next rowset id:  {}", metadata.next_rowset_id);
    println!("  Rowsets:         {}", metadata.rowsets.len());
    println!("  Segments:        {}", metadata.num_segments());
    println!("  Rows:            {}", metadata.num_rows());
    println!("  Data size:       {} bytes", metadata.data_size());

    if metadata.rowsets.is_empty() {
        return;
    }
    println!();
    println!(
        "  {:>10}  {:>10}  {:>12}  {:>8}  {}",
        "rowset", "rows", "bytes", "segments", "overlapped"
    );
    for rowset in &metadata.rowsets {
        println!(
            "  {:>10}  {:>10}  {:>12}  {:>8}  {}",
            rowset.id.as_u32(),
            rowset.num_rows,
            rowset.data_size,
            rowset.num_segments(),
            if rowset.overlapped { "yes" } else { "no" }
        );
    }
}
