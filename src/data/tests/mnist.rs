//! MNIST 单元测试：用本地伪造的 IDX 文件，不访问网络

use std::fs;
use std::path::Path;

use super::download::gzip;
use crate::data::mnist::default_data_dir;
use crate::data::{DataError, load_mnist};

fn write_idx(dir: &Path, name: &str, header: usize, body: &[u8]) {
    let mut bytes = vec![0; header];
    bytes.extend_from_slice(body);
    fs::write(dir.join(name), gzip(&bytes)).unwrap();
}

fn write_fake_mnist(dir: &Path, train: usize, test: usize) {
    fs::create_dir_all(dir).unwrap();
    let image = 28 * 28;
    let pixels = |n: usize| (0..n * image).map(|i| (i % 256) as u8).collect::<Vec<_>>();
    let labels = |n: usize| (0..n).map(|i| (i % 3) as u8).collect::<Vec<_>>();
    write_idx(dir, "train-images-idx3-ubyte.gz", 16, &pixels(train));
    write_idx(dir, "train-labels-idx1-ubyte.gz", 8, &labels(train));
    write_idx(dir, "t10k-images-idx3-ubyte.gz", 16, &pixels(test));
    write_idx(dir, "t10k-labels-idx1-ubyte.gz", 8, &labels(test));
}

#[test]
fn test_default_data_dir() {
    assert_eq!(default_data_dir(), Path::new("datasets").join("mnist"));
}

#[test]
fn test_load_mnist_from_local_files() {
    let dir = std::env::temp_dir().join("okapi_mnist_unit_test");
    write_fake_mnist(&dir, 6, 3);

    let mnist = load_mnist(Some(&dir), 2).unwrap();
    fs::remove_dir_all(&dir).ok();

    assert_eq!(mnist.x_train.shape(), &[4, 1, 28, 28]);
    assert_eq!(mnist.y_train.shape(), &[4, 3]);
    assert_eq!(mnist.x_val.shape(), &[2, 1, 28, 28]);
    assert_eq!(mnist.y_val.shape(), &[2, 3]);
    assert_eq!(mnist.x_test.shape(), &[3, 1, 28, 28]);
    assert_eq!(mnist.y_test.to_vec()[..3], [1.0, 0.0, 0.0]);

    let pixels = mnist.x_train.to_vec();
    assert_eq!(pixels[1], 1.0 / 256.0);
    assert!(pixels.iter().all(|p| (0.0..1.0).contains(p)));
}

#[test]
fn test_load_mnist_rejects_truncated_images() {
    let dir = std::env::temp_dir().join("okapi_mnist_truncated_unit_test");
    write_fake_mnist(&dir, 2, 1);
    write_idx(&dir, "train-images-idx3-ubyte.gz", 16, &[0; 100]);

    let result = load_mnist(Some(&dir), 0);
    fs::remove_dir_all(&dir).ok();
    assert!(matches!(result, Err(DataError::FormatError(_))));
}
