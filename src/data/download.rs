//! 通用下载工具
//!
//! 提供“缺失才下载”、MD5 校验与 gzip 解压，供各数据集复用。

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use log::info;
use md5::{Digest, Md5};

use super::error::DataError;

/// 下载文件并保存到指定路径
///
/// # 参数
/// - `url`: 下载地址
/// - `dest_path`: 保存路径
/// - `expected_md5`: 可选的 MD5 校验码，提供时会验证下载内容
pub fn download_file(
    url: &str,
    dest_path: &Path,
    expected_md5: Option<&str>,
) -> Result<(), DataError> {
    info!("正在下载 {url} ...");

    let response = ureq::get(url)
        .call()
        .map_err(|e| DataError::DownloadError(format!("HTTP 请求失败: {e}")))?;

    if response.status() != 200 {
        return Err(DataError::DownloadError(format!(
            "HTTP 状态码: {}",
            response.status()
        )));
    }

    let mut bytes = Vec::new();
    response
        .into_reader()
        .read_to_end(&mut bytes)
        .map_err(|e| DataError::DownloadError(format!("读取响应失败: {e}")))?;

    // MD5 校验（如果提供了预期值）
    if let Some(expected) = expected_md5 {
        let actual = compute_md5(&bytes);
        if actual != expected {
            return Err(DataError::ChecksumMismatch {
                expected: expected.to_string(),
                got: actual,
            });
        }
        info!("MD5 校验通过: {actual}");
    }

    fs::write(dest_path, &bytes)?;

    info!("下载完成: {dest_path:?}");
    Ok(())
}

/// 计算数据的 MD5 校验码
pub fn compute_md5(data: &[u8]) -> String {
    let mut hasher = Md5::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// 解压 gzip 数据
pub fn gunzip(bytes: &[u8]) -> Result<Vec<u8>, DataError> {
    let mut decoded = Vec::new();
    GzDecoder::new(bytes)
        .read_to_end(&mut decoded)
        .map_err(|e| DataError::DecompressionError(e.to_string()))?;
    Ok(decoded)
}

/// 取得数据文件的原始字节（跳过`offset`字节的文件头）
///
/// 文件`dest_dir/filename`不存在时从`source + filename`下载；
/// 以`.gz`结尾的文件会先解压。
///
/// # 示例
/// ```ignore
/// let pixels = get_file("t10k-images-idx3-ubyte.gz", MNIST_BASE_URL, dir, None, 16)?;
/// ```
pub fn get_file(
    filename: &str,
    source: &str,
    dest_dir: &Path,
    expected_md5: Option<&str>,
    offset: usize,
) -> Result<Vec<u8>, DataError> {
    let path = ensure_file(filename, source, dest_dir, expected_md5)?;
    let raw = fs::read(&path)?;
    let bytes = if filename.ends_with(".gz") {
        gunzip(&raw)?
    } else {
        raw
    };
    if bytes.len() < offset {
        return Err(DataError::FormatError(format!(
            "{filename} 只有 {} 字节，不足文件头的 {offset} 字节",
            bytes.len()
        )));
    }
    Ok(bytes[offset..].to_vec())
}

/// 确保文件存在，必要时下载
fn ensure_file(
    filename: &str,
    source: &str,
    dest_dir: &Path,
    expected_md5: Option<&str>,
) -> Result<PathBuf, DataError> {
    let path = dest_dir.join(filename);
    if path.exists() {
        return Ok(path);
    }
    fs::create_dir_all(dest_dir)?;
    download_file(&format!("{source}{filename}"), &path, expected_md5)?;
    Ok(path)
}
