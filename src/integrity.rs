//! Model file integrity checks
//!
//! Lightweight heuristics that keep the runtime from loading corrupt or
//! truncated model artifacts: format-specific magic bytes plus relaxed size
//! floors against the declared download size. Any I/O failure counts as an
//! invalid file; this module never returns an error to the caller.

use std::fs::{self, File};
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// No legitimate model artifact is smaller than this.
const MIN_MODEL_BYTES: u64 = 1024 * 1024;

/// Containers the zip parser rejects are still accepted above this size;
/// some valid `.task` bundles use a raw FlatBuffer layout.
const RAW_CONTAINER_FLOOR: u64 = 10 * 1024 * 1024;

const GGUF_MAGIC: [u8; 4] = *b"GGUF";
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// Validate a model file (or multi-file model directory) against its declared
/// format and expected size.
///
/// `expected_size_bytes == 0` means the size is unknown and the size check
/// always passes.
pub fn validate_model_file(path: &Path, model_format: &str, expected_size_bytes: u64) -> bool {
    if !path.exists() {
        debug!("File does not exist: {}", path.display());
        return false;
    }

    let actual_size = match resolved_size(path) {
        Ok(size) => size,
        Err(e) => {
            debug!("Failed to stat {}: {}", path.display(), e);
            return false;
        }
    };
    debug!(
        "Validating: {}, format: {}, is_dir: {}, actual: {}, expected: {}",
        path.display(),
        model_format,
        path.is_dir(),
        actual_size,
        expected_size_bytes
    );

    if actual_size < MIN_MODEL_BYTES {
        debug!("FAILURE: file too small for any model (<1MiB)");
        return false;
    }

    match model_format.to_lowercase().as_str() {
        "gguf" | "bin" => {
            let magic_ok = has_gguf_magic(path);
            // With the magic intact, quantization variants make the size
            // wildly non-linear, so allow down to 50% of the declared size.
            // Without it, only an almost-exact size lets a raw .bin through.
            let threshold = if magic_ok { 0.50 } else { 0.90 };
            let size_ok = size_within(actual_size, expected_size_bytes, threshold);

            if !magic_ok {
                debug!("GGUF magic mismatch for {}", path.display());
            }
            if !size_ok {
                debug!(
                    "GGUF size failure: {} < {}% of {}",
                    actual_size,
                    (threshold * 100.0) as u32,
                    expected_size_bytes
                );
            }
            magic_ok && size_ok
        }
        "task" | "litertlm" => {
            let zip_ok = is_task_likely_valid(path);
            let size_ok = size_within(actual_size, expected_size_bytes, 0.90);

            if !zip_ok {
                debug!("Task/ZIP format check failed for {}", path.display());
            }
            if !size_ok {
                debug!(
                    "Task size failure: {} < 90% of {}",
                    actual_size, expected_size_bytes
                );
            }
            zip_ok && size_ok
        }
        "onnx" => {
            let size_ok = size_within(actual_size, expected_size_bytes, 0.90);
            if !size_ok {
                debug!(
                    "ONNX size failure: {} < 90% of {}",
                    actual_size, expected_size_bytes
                );
            }
            size_ok
        }
        other => {
            let size_ok = size_within(actual_size, expected_size_bytes, 0.90);
            if !size_ok {
                debug!(
                    "Size failure for format {:?}: {} < 90% of {}",
                    other, actual_size, expected_size_bytes
                );
            }
            size_ok
        }
    }
}

/// Directory models sum their immediate file children; plain files report
/// their own length.
fn resolved_size(path: &Path) -> std::io::Result<u64> {
    if path.is_dir() {
        let mut total = 0u64;
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            let meta = entry.metadata()?;
            if meta.is_file() {
                total += meta.len();
            }
        }
        Ok(total)
    } else {
        Ok(fs::metadata(path)?.len())
    }
}

fn size_within(actual: u64, expected: u64, threshold: f64) -> bool {
    if expected == 0 {
        return true;
    }
    actual >= (expected as f64 * threshold) as u64
}

fn has_gguf_magic(path: &Path) -> bool {
    match read_leading_bytes(path) {
        Some(magic) => magic == GGUF_MAGIC,
        None => false,
    }
}

/// `.task` / `.litertlm` bundles are zip containers. Checking the local-file
/// header first avoids parsing the whole archive on the hot path.
fn is_task_likely_valid(path: &Path) -> bool {
    if let Some(magic) = read_leading_bytes(path) {
        if magic == ZIP_MAGIC {
            return true;
        }
    }

    match File::open(path) {
        Ok(file) => {
            if zip::ZipArchive::new(file).is_ok() {
                return true;
            }
        }
        Err(e) => {
            debug!("Failed to open {} for zip probe: {}", path.display(), e);
        }
    }

    fs::metadata(path)
        .map(|m| m.len() >= RAW_CONTAINER_FLOOR)
        .unwrap_or(false)
}

fn read_leading_bytes(path: &Path) -> Option<[u8; 4]> {
    let mut file = File::open(path).ok()?;
    let mut magic = [0u8; 4];
    file.read_exact(&mut magic).ok()?;
    Some(magic)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_model(dir: &Path, name: &str, magic: &[u8], total_len: usize) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(magic).unwrap();
        file.write_all(&vec![0u8; total_len.saturating_sub(magic.len())])
            .unwrap();
        file.flush().unwrap();
        path
    }

    const TWO_MIB: usize = 2 * 1024 * 1024;

    #[test]
    fn test_under_one_mib_always_invalid() {
        let dir = tempdir().unwrap();
        let path = write_model(dir.path(), "tiny.gguf", b"GGUF", 1024);
        assert!(!validate_model_file(&path, "gguf", 0));
        assert!(!validate_model_file(&path, "task", 0));
        assert!(!validate_model_file(&path, "onnx", 1024));
        assert!(!validate_model_file(&path, "mystery", 0));
    }

    #[test]
    fn test_missing_file_invalid() {
        let dir = tempdir().unwrap();
        assert!(!validate_model_file(&dir.path().join("absent.gguf"), "gguf", 0));
    }

    #[test]
    fn test_gguf_magic_with_half_size_passes() {
        let dir = tempdir().unwrap();
        let path = write_model(dir.path(), "model.gguf", b"GGUF", TWO_MIB);
        // actual is exactly 50% of expected
        assert!(validate_model_file(&path, "gguf", (TWO_MIB * 2) as u64));
    }

    #[test]
    fn test_gguf_magic_below_half_size_fails() {
        let dir = tempdir().unwrap();
        let path = write_model(dir.path(), "model.gguf", b"GGUF", TWO_MIB);
        // actual is ~49% of expected
        let expected = (TWO_MIB as f64 / 0.49) as u64;
        assert!(!validate_model_file(&path, "gguf", expected));
    }

    #[test]
    fn test_gguf_wrong_magic_fails_even_at_full_size() {
        let dir = tempdir().unwrap();
        let path = write_model(dir.path(), "model.gguf", b"XXXX", TWO_MIB);
        assert!(!validate_model_file(&path, "gguf", TWO_MIB as u64));
    }

    #[test]
    fn test_gguf_case_insensitive_format() {
        let dir = tempdir().unwrap();
        let path = write_model(dir.path(), "model.gguf", b"GGUF", TWO_MIB);
        assert!(validate_model_file(&path, "GGUF", 0));
    }

    #[test]
    fn test_task_zip_signature_passes_without_valid_archive() {
        let dir = tempdir().unwrap();
        let path = write_model(dir.path(), "model.task", &ZIP_MAGIC, TWO_MIB);
        assert!(validate_model_file(&path, "task", TWO_MIB as u64));
        assert!(validate_model_file(&path, "litertlm", 0));
    }

    #[test]
    fn test_task_no_signature_small_file_fails() {
        let dir = tempdir().unwrap();
        // 2 MiB of zeros: no zip signature, unparseable, under the 10 MiB
        // raw-container floor.
        let path = write_model(dir.path(), "model.task", &[], TWO_MIB);
        assert!(!validate_model_file(&path, "task", 0));
    }

    #[test]
    fn test_task_raw_layout_over_ten_mib_passes() {
        let dir = tempdir().unwrap();
        let path = write_model(dir.path(), "model.task", &[], 11 * 1024 * 1024);
        assert!(validate_model_file(&path, "task", 0));
    }

    #[test]
    fn test_task_size_floor() {
        let dir = tempdir().unwrap();
        let path = write_model(dir.path(), "model.task", &ZIP_MAGIC, TWO_MIB);
        // 2 MiB actual vs 4 MiB expected is under the 90% floor
        assert!(!validate_model_file(&path, "task", (TWO_MIB * 2) as u64));
    }

    #[test]
    fn test_onnx_and_unknown_formats_use_size_only() {
        let dir = tempdir().unwrap();
        let path = write_model(dir.path(), "model.onnx", &[], TWO_MIB);
        assert!(validate_model_file(&path, "onnx", TWO_MIB as u64));
        assert!(!validate_model_file(&path, "onnx", (TWO_MIB * 2) as u64));
        assert!(validate_model_file(&path, "safetensors", 0));
    }

    #[test]
    fn test_directory_sums_immediate_children() {
        let dir = tempdir().unwrap();
        let model_dir = dir.path().join("sharded");
        fs::create_dir(&model_dir).unwrap();
        write_model(&model_dir, "part-0", &[], TWO_MIB);
        write_model(&model_dir, "part-1", &[], TWO_MIB);
        assert!(validate_model_file(&model_dir, "onnx", (TWO_MIB * 2) as u64));
    }
}
