// Copyright 2026 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use spp_derive::spp_inline;

#[spp_inline(
    r#"
Row(width) {
    pixels: uint8[width * 3];
    padding: uint8[(4 - (width * 3) % 4) % 4];
}

Image {
    width: uint8;
    height: uint8;
    rows: Row(width)[height];
}

Grid(columns, lines) {
    cells: uint8[columns * lines];
}

Frame {
    grid: Grid(2);
}
"#
)]
#[cfg(test)]
mod parameters {
    fn bytes(values: &[i128]) -> Value {
        Value::Array(values.iter().copied().map(Value::Int).collect())
    }

    #[test]
    fn test_row() {
        let args = Record::from([("width", Value::Int(1))]);
        let (row, offset) = parse_row(&[1, 2, 3, 0], 0, &args).unwrap();
        assert_eq!(offset, 4);
        assert_eq!(row["pixels"], bytes(&[1, 2, 3]));
        assert_eq!(row["padding"], bytes(&[0]));
    }

    #[test]
    fn test_image() {
        let data = [2, 2, 1, 2, 3, 4, 5, 6, 0, 0, 7, 8, 9, 10, 11, 12, 0, 0];
        let (image, offset) = parse_image(&data, 0, &Record::new()).unwrap();
        assert_eq!(offset, data.len());
        let row = |pixels: &[i128]| {
            Value::Record(Record::from([("pixels", bytes(pixels)), ("padding", bytes(&[0, 0]))]))
        };
        assert_eq!(
            image["rows"],
            Value::Array(vec![row(&[1, 2, 3, 4, 5, 6]), row(&[7, 8, 9, 10, 11, 12])])
        );
    }

    #[test]
    fn test_err_missing_argument() {
        assert_eq!(
            parse_row(&[0; 4], 0, &Record::new()),
            Err(DecodeError::MissingArgument { name: "width" })
        );
        assert_eq!(
            parse_frame(&[0; 4], 0, &Record::new()),
            Err(DecodeError::MissingArgument { name: "lines" })
        );
    }

    #[test]
    fn test_extra_arguments_are_ignored() {
        let args = Record::from([
            ("columns", Value::Int(1)),
            ("lines", Value::Int(2)),
            ("depth", Value::Int(3)),
        ]);
        let (grid, offset) = parse_grid(&[4, 5], 0, &args).unwrap();
        assert_eq!(offset, 2);
        assert_eq!(grid["cells"], bytes(&[4, 5]));
    }
}

#[spp_inline(
    r#"
Header { size: uint8; kind: uint8; }

Body {
    header: Header;
    payload: uint8[header.size - 2];
    checksum: uint8[header.kind & 0x1];
}

Broken {
    a: uint8;
    b: Missing;
}
"#
)]
#[cfg(test)]
mod nested {
    #[test]
    fn test_field_access() {
        let (body, offset) = parse_body(&[4, 1, 7, 8, 0xcc], 0, &Record::new()).unwrap();
        assert_eq!(offset, 5);
        assert_eq!(
            body["header"],
            Value::Record(Record::from([("size", Value::Int(4)), ("kind", Value::Int(1))]))
        );
        assert_eq!(body["payload"], Value::Array(vec![Value::Int(7), Value::Int(8)]));
        assert_eq!(body["checksum"], Value::Array(vec![Value::Int(0xcc)]));
    }

    #[test]
    fn test_err_negative_array_size() {
        assert_eq!(
            parse_body(&[1, 0], 0, &Record::new()),
            Err(DecodeError::InvalidArraySize { value: String::from("-1") })
        );
    }

    #[test]
    fn test_err_undefined_struct() {
        assert_eq!(
            parse_broken(&[1, 2], 0, &Record::new()),
            Err(DecodeError::UndefinedStruct { name: "Missing" })
        );
    }
}

#[spp_inline(
    r#"
#define HELPER_WIDTH 4
@endian little

Helper "pub fn helper_width() -> usize { 4 }"

Pair {
    endian little;
    first: uint8;
    second: uint8;
}
"#
)]
#[cfg(test)]
mod directives {
    #[test]
    fn test_passthrough() {
        assert_eq!(helper_width(), 4);
    }

    #[test]
    fn test_directives_are_inert() {
        let (pair, offset) = parse_pair(&[1, 2], 0, &Record::new()).unwrap();
        assert_eq!(offset, 2);
        assert_eq!(pair, Record::from([("first", Value::Int(1)), ("second", Value::Int(2))]));
    }
}

#[spp_inline(
    r#"
Empty { }

Markers {
    count: uint64;
    empty: Empty[count];
}

Gaps {
    count: uint64;
    gaps: 0B[count];
}
"#
)]
#[cfg(test)]
mod empty_elements {
    #[test]
    fn test_small_arrays() {
        let data = [3, 0, 0, 0, 0, 0, 0, 0];
        let (markers, offset) = parse_markers(&data, 0, &Record::new()).unwrap();
        assert_eq!(offset, 8);
        assert_eq!(markers["empty"], Value::Array(vec![Value::Record(Record::new()); 3]));

        let (gaps, offset) = parse_gaps(&data, 0, &Record::new()).unwrap();
        assert_eq!(offset, 8);
        assert_eq!(gaps["gaps"], Value::Array(vec![Value::Bytes(Default::default()); 3]));
    }

    #[test]
    fn test_err_array_too_large() {
        let data = u64::MAX.to_le_bytes();
        assert!(matches!(
            parse_markers(&data, 0, &Record::new()),
            Err(DecodeError::ArrayTooLarge { .. })
        ));
        assert!(matches!(
            parse_gaps(&data, 0, &Record::new()),
            Err(DecodeError::ArrayTooLarge { .. })
        ));
    }
}
