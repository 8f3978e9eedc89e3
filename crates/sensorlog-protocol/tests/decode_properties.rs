//! 解码性质测试
//!
//! - 24 字段且姿态字段为浮点数：输出 = 弧度 * 180/π（逐分量）
//! - 其他字段数：不产生样本，不报错

use proptest::prelude::*;
use sensorlog_protocol::*;

/// 不含分隔符和换行的任意字段
fn field() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9. :_-]{0,12}"
}

proptest! {
    #[test]
    fn prop_complete_record_converts_to_degrees(
        x in -10.0f64..10.0,
        y in -10.0f64..10.0,
        z in -10.0f64..10.0,
    ) {
        let line = encode_record(Euler::new(Rad(x), Rad(y), Rad(z)));
        let sample = decode_line(&line).unwrap().sample().unwrap();

        let factor = 180.0 / std::f64::consts::PI;
        prop_assert!((sample.x.0 - x * factor).abs() < 1e-9);
        prop_assert!((sample.y.0 - y * factor).abs() < 1e-9);
        prop_assert!((sample.z.0 - z * factor).abs() < 1e-9);
    }

    #[test]
    fn prop_wrong_field_count_never_yields_sample(
        fields in prop::collection::vec(field(), 1..60)
            .prop_filter("not a complete record", |f| f.len() != RECORD_FIELD_COUNT),
    ) {
        let line = fields.join(",");
        let decoded = decode_line(&line);
        prop_assert_eq!(decoded, Ok(Decoded::Skipped { fields: fields.len() }));
    }

    #[test]
    fn prop_arbitrary_text_never_panics(line in "\\PC{0,300}") {
        let _ = decode_line(&line);
    }
}
