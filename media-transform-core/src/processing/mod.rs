pub mod negotiation;
pub mod pcm_convert;
pub mod row_copy;
pub mod sample_pipeline;
