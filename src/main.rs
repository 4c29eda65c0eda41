//! # photo-curate CLI
//!
//! Command-line interface for the photo curation engine.
//!
//! ## Usage
//! ```bash
//! photo-curate analyze records.json --preset quality-focused
//! photo-curate analyze records.json --output json
//! photo-curate hash IMG_0001.jpg IMG_0002.jpg
//! ```

mod cli;

use photo_curation::Result;

fn main() -> Result<()> {
    photo_curation::init_tracing();
    cli::run()
}
