#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Vectors must be the same length for cosine similarity ({left} vs {right}).")]
pub struct DimensionMismatch {
	pub left: usize,
	pub right: usize,
}

/// Cosine similarity of two equal-length vectors. Returns exactly 0.0 when
/// either vector has zero magnitude; this is a product convention, not a
/// mathematical identity.
pub fn cosine_sim(a: &[f32], b: &[f32]) -> Result<f32, DimensionMismatch> {
	if a.len() != b.len() {
		return Err(DimensionMismatch { left: a.len(), right: b.len() });
	}

	let mut dot = 0.0f64;
	let mut mag_a = 0.0f64;
	let mut mag_b = 0.0f64;

	for (&ai, &bi) in a.iter().zip(b.iter()) {
		let (ai, bi) = (ai as f64, bi as f64);
		dot += ai * bi;
		mag_a += ai * ai;
		mag_b += bi * bi;
	}

	if mag_a == 0.0 || mag_b == 0.0 {
		return Ok(0.0);
	}

	Ok((dot / (mag_a.sqrt() * mag_b.sqrt())) as f32)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn identical_vectors_score_one() {
		let v = [0.3f32, -0.7, 0.2];
		let sim = cosine_sim(&v, &v).expect("same length");
		assert!((sim - 1.0).abs() < 1e-6);
	}

	#[test]
	fn is_symmetric() {
		let a = [1.0f32, 2.0, 3.0];
		let b = [-2.0f32, 0.5, 4.0];
		let ab = cosine_sim(&a, &b).expect("same length");
		let ba = cosine_sim(&b, &a).expect("same length");
		assert_eq!(ab, ba);
	}

	#[test]
	fn rejects_mismatched_lengths() {
		let err = cosine_sim(&[1.0], &[1.0, 2.0]).unwrap_err();
		assert_eq!(err, DimensionMismatch { left: 1, right: 2 });
	}

	#[test]
	fn zero_magnitude_yields_zero() {
		assert_eq!(cosine_sim(&[0.0, 0.0], &[1.0, 2.0]).expect("same length"), 0.0);
	}

	#[test]
	fn orthogonal_vectors_score_zero() {
		let sim = cosine_sim(&[1.0, 0.0], &[0.0, 1.0]).expect("same length");
		assert!(sim.abs() < 1e-6);
	}
}
