//! TensorFlow data type helpers

use crate::proto::DataType;

/// Offset between a type and its `DT_*_REF` counterpart
pub const REF_OFFSET: i32 = 100;

/// Convert a wire value to [`DataType`], falling back to `DT_INVALID`
pub fn i32_to_dtype(value: i32) -> DataType {
    DataType::try_from(value).unwrap_or(DataType::DtInvalid)
}

/// Check if the type is a reference type (`DT_*_REF`)
pub fn is_ref_type(dtype: DataType) -> bool {
    dtype as i32 > REF_OFFSET
}

/// Strip the reference marker from a type
pub fn base_dtype(dtype: DataType) -> DataType {
    if is_ref_type(dtype) {
        i32_to_dtype(dtype as i32 - REF_OFFSET)
    } else {
        dtype
    }
}

/// Reference counterpart of a type; `DT_INVALID` and ref types map to themselves
pub fn ref_dtype(dtype: DataType) -> DataType {
    match dtype {
        DataType::DtInvalid => dtype,
        _ => DataType::try_from(base_dtype(dtype) as i32 + REF_OFFSET).unwrap_or(dtype),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_dtype() {
        assert_eq!(base_dtype(DataType::DtFloatRef), DataType::DtFloat);
        assert_eq!(base_dtype(DataType::DtInt32), DataType::DtInt32);
        assert!(is_ref_type(DataType::DtInt64Ref));
        assert!(!is_ref_type(DataType::DtInt64));
    }

    #[test]
    fn test_ref_dtype() {
        assert_eq!(ref_dtype(DataType::DtFloat), DataType::DtFloatRef);
        assert_eq!(ref_dtype(DataType::DtFloatRef), DataType::DtFloatRef);
        assert_eq!(ref_dtype(DataType::DtInvalid), DataType::DtInvalid);
    }

    #[test]
    fn test_i32_to_dtype() {
        assert_eq!(i32_to_dtype(1), DataType::DtFloat);
        assert_eq!(i32_to_dtype(9), DataType::DtInt64);
        assert_eq!(i32_to_dtype(999), DataType::DtInvalid);
    }
}
