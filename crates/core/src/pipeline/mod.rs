pub mod mask_image_use_case;
pub mod masked_destination;
pub mod masking_error;
