//! Tiny hand-encoded ONNX graphs for exercising the real inference path in
//! tests without shipping a trained artifact.
//!
//! The standard fixture is a single `ReduceMean` over every non-batch axis,
//! so its "fake probability" is the mean normalized pixel value: black
//! photos come out AUTHENTIC and white photos come out FAKE.

use std::io;
use std::path::Path;

const ONNX_FLOAT: u64 = 1;
const ATTR_INT: u64 = 2;
const ATTR_INTS: u64 = 7;

/// Model taking `(1, 224, 224, 3)` and returning `(1, 1, 1, 1)`.
pub fn mean_pixel_model() -> Vec<u8> {
    reduce_mean_model(&[1, 224, 224, 3], &[1, 2, 3], &[1, 1, 1, 1])
}

/// Model whose declared input is channels-first, so NHWC input is rejected
/// by the runtime at inference time.
pub fn channels_first_model() -> Vec<u8> {
    reduce_mean_model(&[1, 3, 224, 224], &[1, 2, 3], &[1, 1, 1, 1])
}

pub fn write_mean_pixel_model(path: &Path) -> io::Result<()> {
    std::fs::write(path, mean_pixel_model())
}

pub fn write_channels_first_model(path: &Path) -> io::Result<()> {
    std::fs::write(path, channels_first_model())
}

fn reduce_mean_model(input_dims: &[u64], axes: &[u64], output_dims: &[u64]) -> Vec<u8> {
    let mut node = Vec::new();
    put_str(&mut node, 1, "input");
    put_str(&mut node, 2, "output");
    put_str(&mut node, 3, "mean");
    put_str(&mut node, 4, "ReduceMean");

    let mut axes_attr = Vec::new();
    put_str(&mut axes_attr, 1, "axes");
    for &axis in axes {
        put_varint_field(&mut axes_attr, 8, axis);
    }
    put_varint_field(&mut axes_attr, 20, ATTR_INTS);
    put_bytes(&mut node, 5, &axes_attr);

    let mut keepdims = Vec::new();
    put_str(&mut keepdims, 1, "keepdims");
    put_varint_field(&mut keepdims, 3, 1);
    put_varint_field(&mut keepdims, 20, ATTR_INT);
    put_bytes(&mut node, 5, &keepdims);

    let mut graph = Vec::new();
    put_bytes(&mut graph, 1, &node);
    put_str(&mut graph, 2, "fixture");
    put_bytes(&mut graph, 11, &value_info("input", input_dims));
    put_bytes(&mut graph, 12, &value_info("output", output_dims));

    let mut opset = Vec::new();
    put_str(&mut opset, 1, "");
    put_varint_field(&mut opset, 2, 13);

    let mut model = Vec::new();
    put_varint_field(&mut model, 1, 7);
    put_str(&mut model, 2, "authcheck-fixture");
    put_bytes(&mut model, 7, &graph);
    put_bytes(&mut model, 8, &opset);
    model
}

fn value_info(name: &str, dims: &[u64]) -> Vec<u8> {
    let mut shape = Vec::new();
    for &d in dims {
        let mut dim = Vec::new();
        put_varint_field(&mut dim, 1, d);
        put_bytes(&mut shape, 1, &dim);
    }

    let mut tensor = Vec::new();
    put_varint_field(&mut tensor, 1, ONNX_FLOAT);
    put_bytes(&mut tensor, 2, &shape);

    let mut ty = Vec::new();
    put_bytes(&mut ty, 1, &tensor);

    let mut info = Vec::new();
    put_str(&mut info, 1, name);
    put_bytes(&mut info, 2, &ty);
    info
}

fn put_varint(out: &mut Vec<u8>, mut v: u64) {
    while v >= 0x80 {
        out.push((v as u8) | 0x80);
        v >>= 7;
    }
    out.push(v as u8);
}

fn put_varint_field(out: &mut Vec<u8>, field: u64, v: u64) {
    put_varint(out, field << 3);
    put_varint(out, v);
}

fn put_bytes(out: &mut Vec<u8>, field: u64, bytes: &[u8]) {
    put_varint(out, (field << 3) | 2);
    put_varint(out, bytes.len() as u64);
    out.extend_from_slice(bytes);
}

fn put_str(out: &mut Vec<u8>, field: u64, s: &str) {
    put_bytes(out, field, s.as_bytes());
}
