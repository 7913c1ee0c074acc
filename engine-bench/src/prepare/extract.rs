use flate2::read::GzDecoder;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::Result;

/// Unpack a `.tgz` archive into `dest`
pub fn extract(archive: &Path, dest: &Path) -> Result<()> {
    log::info!("Extracting {} into {}", archive.display(), dest.display());
    let file = File::open(archive)?;
    let mut tarball = tar::Archive::new(GzDecoder::new(BufReader::new(file)));
    tarball.unpack(dest)?;
    Ok(())
}
