// tests/native_roundtrip_tests.rs
use hdfview_model::native::message::{self, MAX_NESTING_DEPTH};
use hdfview_model::*;

fn atomic(class: DatatypeClass, size: i64, order: ByteOrder, sign: Sign) -> Datatype {
    Datatype::new(class, size, order, sign, None).unwrap()
}

fn roundtrip(registry: &Hdf5TypeRegistry, dt: &Datatype) -> Datatype {
    let handle = NativeHandle::create(registry, dt).unwrap();
    handle.to_datatype().unwrap()
}

#[test]
fn test_composite_roundtrips() {
    let registry = Hdf5TypeRegistry::new();
    let int16 = atomic(DatatypeClass::Integer, 2, ByteOrder::BigEndian, Sign::TwosComplement);
    let float64 = atomic(DatatypeClass::Float, 8, ByteOrder::LittleEndian, Sign::Native);

    let cases = vec![
        Datatype::array(float64.clone(), &[2, 3, 4]).unwrap(),
        Datatype::vlen(int16.clone()),
        Datatype::complex(float64.clone()).unwrap(),
        Datatype::enumeration(int16.clone(), "0=OFF, 1=ON, -5=FAULT").unwrap(),
        Datatype::compound(
            -1,
            [
                ("when", float64.clone(), 0),
                ("code", int16.clone(), 8),
                ("grid", Datatype::array(int16.clone(), &[2, 2]).unwrap(), 10),
            ],
        )
        .unwrap(),
    ];

    for dt in &cases {
        let back = roundtrip(&registry, dt);
        assert_eq!(&back, dt, "roundtrip of {}", dt);
        assert_eq!(back.description(), dt.description());
    }
    assert_eq!(registry.open_handles(), 0);
}

#[test]
fn test_wide_compound_uses_wider_offsets() {
    let registry = Hdf5TypeRegistry::new();
    let int32 = atomic(DatatypeClass::Integer, 4, ByteOrder::LittleEndian, Sign::None);
    let dt = Datatype::compound(70_000, [("head", int32.clone(), 0), ("tail", int32, 69_996)]).unwrap();

    let back = roundtrip(&registry, &dt);
    assert_eq!(back.compound_members().offsets().collect::<Vec<_>>(), vec![0, 69_996]);
    assert_eq!(back.size(), TypeSize::Bytes(70_000));
}

#[test]
fn test_native_fields_resolve_on_encode() {
    let registry = Hdf5TypeRegistry::new();
    let native_float = atomic(DatatypeClass::Float, NATIVE as i64, ByteOrder::Native, Sign::Native);
    let back = roundtrip(&registry, &native_float);
    assert_eq!(back.size(), TypeSize::Bytes(4));
    assert_eq!(back.order(), ByteOrder::host());

    let reference = atomic(DatatypeClass::Reference, NATIVE as i64, ByteOrder::None, Sign::Native);
    assert_eq!(roundtrip(&registry, &reference).size(), TypeSize::Bytes(8));

    let bitfield = atomic(DatatypeClass::BitField, NATIVE as i64, ByteOrder::Native, Sign::Native);
    assert_eq!(roundtrip(&registry, &bitfield).size(), TypeSize::Bytes(1));
}

#[test]
fn test_variable_string_keeps_native_size() {
    let registry = Hdf5TypeRegistry::new();
    let back = roundtrip(&registry, &Datatype::variable_string());
    assert!(back.is_string());
    assert!(back.is_variable_str());
    assert_eq!(back.size(), TypeSize::Native);
    assert!(registry.is_text(&back));
}

#[test]
fn test_named_type_reopens() {
    let registry = Hdf5TypeRegistry::new();
    let base = atomic(DatatypeClass::Integer, 4, ByteOrder::LittleEndian, Sign::None);
    let named = registry
        .commit("status_t", &Datatype::enumeration(base, "0=OK, 1=BAD").unwrap())
        .unwrap();

    let handle = NativeHandle::from_raw(&registry, registry.open(&named).unwrap());
    let reopened = handle.to_datatype().unwrap();
    assert_eq!(reopened.name(), Some("status_t"));
    assert_eq!(reopened.enum_label("1"), Some("BAD"));
    drop(handle);
    assert_eq!(registry.open_handles(), 0);
}

#[test]
fn test_no_class_cannot_be_encoded() {
    let registry = Hdf5TypeRegistry::new();
    let dt = atomic(DatatypeClass::NoClass, 4, ByteOrder::None, Sign::Native);
    assert!(matches!(registry.create_native(&dt), Err(ModelError::Unsupported(_))));
    assert_eq!(registry.open_handles(), 0);
}

#[test]
fn test_deep_nesting_limit() {
    let mut dt = atomic(DatatypeClass::Integer, 4, ByteOrder::LittleEndian, Sign::None);
    for _ in 1..MAX_NESTING_DEPTH {
        dt = Datatype::vlen(dt);
    }
    assert_eq!(dt.depth(), MAX_NESTING_DEPTH);
    let encoded = message::encode(&dt).unwrap();
    assert!(message::decode(&encoded).is_ok());

    let deeper = Datatype::vlen(dt);
    let encoded = message::encode(&deeper).unwrap();
    assert!(matches!(
        message::decode(&encoded),
        Err(ModelError::NestingTooDeep(MAX_NESTING_DEPTH))
    ));
}

#[test]
fn test_truncated_messages() {
    let dt = Datatype::array(
        atomic(DatatypeClass::Float, 4, ByteOrder::LittleEndian, Sign::Native),
        &[8],
    )
    .unwrap();
    let encoded = message::encode(&dt).unwrap();
    for len in 0..encoded.len() {
        assert!(message::decode(&encoded[..len]).is_err(), "prefix of {} bytes decoded", len);
    }
}
