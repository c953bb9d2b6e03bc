use gdal::vector::FieldValue;
use std::path::Path;

use crate::attribute::{AttrList, AttrValue};

/// Convert a GDAL field value to an attribute value.
///
/// The S-57 driver reports list attributes (`COLOUR`, `CATLIT`, `RESTRN`,
/// ...) as string lists; these become an [`AttrList`]. Empty strings mean
/// "not set" and yield `None`.
pub fn field_value_to_attr(field_value: &FieldValue) -> Option<AttrValue> {
    match field_value {
        FieldValue::StringValue(s) => {
            let s = s.trim();
            if s.is_empty() {
                None
            } else if s.contains(',') {
                Some(
                    AttrList::parse(s)
                        .map(AttrValue::List)
                        .unwrap_or_else(|| AttrValue::Str(s.to_string())),
                )
            } else {
                Some(AttrValue::Str(s.to_string()))
            }
        }
        FieldValue::IntegerValue(i) => Some(AttrValue::Int(i64::from(*i))),
        FieldValue::Integer64Value(i) => Some(AttrValue::Int(*i)),
        FieldValue::RealValue(f) => Some(AttrValue::Float(*f)),
        FieldValue::DateTimeValue(dt) => Some(AttrValue::Str(dt.to_string())),
        FieldValue::DateValue(d) => Some(AttrValue::Str(d.to_string())),
        FieldValue::IntegerListValue(lst) => int_list(lst.iter().map(|i| i64::from(*i))),
        FieldValue::Integer64ListValue(lst) => int_list(lst.iter().copied()),
        FieldValue::RealListValue(lst) if lst.is_empty() => None,
        FieldValue::RealListValue(lst) => Some(AttrValue::Str(
            lst.iter().map(f64::to_string).collect::<Vec<_>>().join(","),
        )),
        FieldValue::StringListValue(lst) => {
            let items: Vec<&str> = lst.iter().map(|s| s.trim()).filter(|s| !s.is_empty()).collect();
            if items.is_empty() {
                return None;
            }
            let codes: Option<AttrList> = items.iter().map(|s| s.parse::<u16>().ok()).collect();
            Some(match codes {
                Some(list) => AttrValue::List(list),
                None => AttrValue::Str(items.join(",")),
            })
        }
    }
}

fn int_list(values: impl Iterator<Item = i64>) -> Option<AttrValue> {
    let list: Option<AttrList> = values.map(|v| u16::try_from(v).ok()).collect();
    list.filter(|l| !l.is_empty()).map(AttrValue::List)
}

/// Extract ENC cell name from directory or file path
pub fn enc_name_from_path(s57_path: &Path) -> String {
    s57_path
        .file_stem()
        .and_then(|name| name.to_str())
        .map(|name| name.split('.').next().unwrap_or(name).to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_attributes() {
        let colour = FieldValue::StringListValue(vec!["1".into(), "3".into()]);
        assert_eq!(
            field_value_to_attr(&colour),
            Some(AttrValue::List(AttrList::from([1, 3])))
        );
        let joined = FieldValue::StringValue("4,5".into());
        assert_eq!(
            field_value_to_attr(&joined),
            Some(AttrValue::List(AttrList::from([4, 5])))
        );
        assert_eq!(
            field_value_to_attr(&FieldValue::StringListValue(vec![])),
            None
        );
    }

    #[test]
    fn test_scalar_attributes() {
        assert_eq!(
            field_value_to_attr(&FieldValue::IntegerValue(3)),
            Some(AttrValue::Int(3))
        );
        assert_eq!(
            field_value_to_attr(&FieldValue::RealValue(4.5)),
            Some(AttrValue::Float(4.5))
        );
        assert_eq!(
            field_value_to_attr(&FieldValue::StringValue("Rock, The".into())),
            Some(AttrValue::Str("Rock, The".into()))
        );
        assert_eq!(field_value_to_attr(&FieldValue::StringValue(" ".into())), None);
    }

    #[test]
    fn test_enc_name_from_path() {
        assert_eq!(enc_name_from_path(Path::new("/data/US5MA1AA/US5MA1AA.000")), "US5MA1AA");
        assert_eq!(enc_name_from_path(Path::new("US3EC10M")), "US3EC10M");
    }
}
