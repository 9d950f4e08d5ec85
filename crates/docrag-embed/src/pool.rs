use anyhow::Result;
use candle_core::{DType, Tensor};

/// Mean of the token states selected by `attention_mask`: `[B,T,H] -> [B,H]`.
///
/// The result is not normalized; callers normalize before comparing vectors.
pub fn masked_mean(hidden: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
    let dims = hidden.dims();
    anyhow::ensure!(dims.len() == 3, "hidden shape must be [B,T,H], got {:?}", dims);
    let (batch, hidden_dim) = (dims[0], dims[2]);

    let mask = attention_mask.to_device(hidden.device())?.to_dtype(hidden.dtype())?;
    let mask_3d = mask.unsqueeze(2)?;
    let mask_broadcast = mask_3d.broadcast_as(hidden.shape())?;
    let masked = (hidden * &mask_broadcast)?;
    let sum = masked.sum(1)?;
    let eps_val = match hidden.dtype() { DType::F16 => 1e-6f32, _ => 1e-12f32 };
    let lengths = mask.sum(1)?.unsqueeze(1)?.to_dtype(sum.dtype())?;
    let lengths = lengths.broadcast_maximum(&Tensor::new(&[eps_val], hidden.device())?.to_dtype(sum.dtype())?)?;
    let mean = sum.broadcast_div(&lengths)?;
    anyhow::ensure!(mean.dims() == [batch, hidden_dim].as_slice(), "unexpected pooled shape {:?}", mean.dims());
    Ok(mean)
}
