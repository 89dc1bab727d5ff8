use crate::error::CommunityParseError;
use itertools::Itertools;
use serde::de::Error as _;
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Standard BGP community as defined in [RFC1997](https://datatracker.ietf.org/doc/html/rfc1997).
///
/// ## Display
///
/// Displayed as `ASN:VALUE`, the same colon-joined form used in filter query
/// parameters.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
pub struct Community {
    pub asn: u32,
    pub value: u32,
}

impl Community {
    pub const fn new(asn: u32, value: u32) -> Community {
        Community { asn, value }
    }
}

/// Large community structure as defined in [RFC8092](https://datatracker.ietf.org/doc/html/rfc8092)
///
/// ## Display
///
/// Displayed as `GLOBAL_ADMINISTRATOR:LOCAL_DATA_1:LOCAL_DATA_2`.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
pub struct LargeCommunity {
    pub global_admin: u32,
    pub local_data: [u32; 2],
}

impl LargeCommunity {
    pub const fn new(global_admin: u32, local_data: [u32; 2]) -> LargeCommunity {
        LargeCommunity {
            global_admin,
            local_data,
        }
    }
}

/// Extended community in the shape looking-glass backends report it: a
/// literal type tag (e.g. `ro` for route origin, `rt` for route target)
/// followed by one or two numeric value fields.
///
/// This is deliberately not the 8-octet wire representation of
/// [RFC4360](https://datatracker.ietf.org/doc/html/rfc4360); the backend has
/// already decoded the type into its tag string.
///
/// ## Display
///
/// Displayed as `TAG:FIELD_1[:FIELD_2]`.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub struct ExtendedCommunity {
    pub tag: String,
    pub fields: SmallVec<[u64; 2]>,
}

impl ExtendedCommunity {
    pub fn new(tag: impl Into<String>, fields: impl IntoIterator<Item = u64>) -> ExtendedCommunity {
        ExtendedCommunity {
            tag: tag.into(),
            fields: fields.into_iter().collect(),
        }
    }
}

/// Umbrella type over the three community flavors attached to a route.
///
/// The JSON form is the positional array the backend sends: `[64512, 100]`
/// for a standard community, `[1234, 1, 2]` for a large community and
/// `["ro", 1, 2]` for an extended community.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub enum MetaCommunity {
    Plain(Community),
    Extended(ExtendedCommunity),
    Large(LargeCommunity),
}

/// A single positional field of a community, as used for classification-tree
/// lookups and label template expansion.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum CommunityField<'a> {
    Num(u64),
    Tag(&'a str),
}

impl CommunityField<'_> {
    pub const fn as_num(&self) -> Option<u64> {
        match self {
            CommunityField::Num(v) => Some(*v),
            CommunityField::Tag(_) => None,
        }
    }
}

impl MetaCommunity {
    /// The ordered fields of the community. Arity 2 for standard, 3 for
    /// large, and 2-3 for extended communities (tag included).
    pub fn fields(&self) -> SmallVec<[CommunityField<'_>; 3]> {
        match self {
            MetaCommunity::Plain(c) => {
                smallvec::smallvec![
                    CommunityField::Num(c.asn as u64),
                    CommunityField::Num(c.value as u64),
                ]
            }
            MetaCommunity::Large(c) => smallvec::smallvec![
                CommunityField::Num(c.global_admin as u64),
                CommunityField::Num(c.local_data[0] as u64),
                CommunityField::Num(c.local_data[1] as u64),
            ],
            MetaCommunity::Extended(c) => {
                let mut fields: SmallVec<[CommunityField<'_>; 3]> =
                    smallvec::smallvec![CommunityField::Tag(c.tag.as_str())];
                fields.extend(c.fields.iter().map(|v| CommunityField::Num(*v)));
                fields
            }
        }
    }
}

impl From<Community> for MetaCommunity {
    fn from(c: Community) -> Self {
        MetaCommunity::Plain(c)
    }
}

impl From<LargeCommunity> for MetaCommunity {
    fn from(c: LargeCommunity) -> Self {
        MetaCommunity::Large(c)
    }
}

impl From<ExtendedCommunity> for MetaCommunity {
    fn from(c: ExtendedCommunity) -> Self {
        MetaCommunity::Extended(c)
    }
}

/////////////
// DISPLAY //
/////////////

impl Display for CommunityField<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CommunityField::Num(v) => write!(f, "{}", v),
            CommunityField::Tag(t) => write!(f, "{}", t),
        }
    }
}

impl Display for Community {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.asn, self.value)
    }
}

impl Display for LargeCommunity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.global_admin, self.local_data[0], self.local_data[1]
        )
    }
}

impl Display for ExtendedCommunity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.tag, self.fields.iter().join(":"))
    }
}

impl Display for MetaCommunity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            MetaCommunity::Plain(c) => write!(f, "{}", c),
            MetaCommunity::Extended(c) => write!(f, "{}", c),
            MetaCommunity::Large(c) => write!(f, "{}", c),
        }
    }
}

/////////////
// FROMSTR //
/////////////

fn parse_num(token: &str) -> Result<u64, CommunityParseError> {
    token
        .parse::<u64>()
        .map_err(|_| CommunityParseError::InvalidField(token.to_string()))
}

fn parse_num_u32(token: &str) -> Result<u32, CommunityParseError> {
    token
        .parse::<u32>()
        .map_err(|_| CommunityParseError::InvalidField(token.to_string()))
}

impl FromStr for Community {
    type Err = CommunityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(CommunityParseError::Empty);
        }
        let tokens = s.split(':').collect::<Vec<&str>>();
        if tokens.len() != 2 {
            return Err(CommunityParseError::FieldCount(tokens.len()));
        }
        Ok(Community::new(
            parse_num_u32(tokens[0])?,
            parse_num_u32(tokens[1])?,
        ))
    }
}

impl FromStr for LargeCommunity {
    type Err = CommunityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(CommunityParseError::Empty);
        }
        let tokens = s.split(':').collect::<Vec<&str>>();
        if tokens.len() != 3 {
            return Err(CommunityParseError::FieldCount(tokens.len()));
        }
        Ok(LargeCommunity::new(
            parse_num_u32(tokens[0])?,
            [parse_num_u32(tokens[1])?, parse_num_u32(tokens[2])?],
        ))
    }
}

impl FromStr for ExtendedCommunity {
    type Err = CommunityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(CommunityParseError::Empty);
        }
        let tokens = s.split(':').collect::<Vec<&str>>();
        let (tag, values) = tokens
            .split_first()
            .ok_or(CommunityParseError::Empty)?;
        if tag.is_empty() || tag.parse::<u64>().is_ok() {
            return Err(CommunityParseError::MissingTag);
        }
        if values.is_empty() || values.len() > 2 {
            return Err(CommunityParseError::ExtendedFieldCount(values.len()));
        }
        let fields = values
            .iter()
            .map(|v| parse_num(v))
            .collect::<Result<SmallVec<[u64; 2]>, _>>()?;
        Ok(ExtendedCommunity {
            tag: tag.to_string(),
            fields,
        })
    }
}

impl FromStr for MetaCommunity {
    type Err = CommunityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(CommunityParseError::Empty);
        }
        let first = s.split(':').next().unwrap_or_default();
        if first.parse::<u64>().is_ok() {
            let field_count = s.split(':').count();
            match field_count {
                2 => Ok(MetaCommunity::Plain(s.parse()?)),
                3 => Ok(MetaCommunity::Large(s.parse()?)),
                n => Err(CommunityParseError::FieldCount(n)),
            }
        } else {
            Ok(MetaCommunity::Extended(s.parse()?))
        }
    }
}

///////////
// SERDE //
///////////

// Communities travel as positional JSON arrays, so the named structs get
// hand-written (de)serializers over the array form.

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawField {
    Num(u64),
    Tag(String),
}

impl Serialize for Community {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        [self.asn, self.value].serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Community {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let [asn, value] = <[u32; 2]>::deserialize(deserializer)?;
        Ok(Community::new(asn, value))
    }
}

impl Serialize for LargeCommunity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        [self.global_admin, self.local_data[0], self.local_data[1]].serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for LargeCommunity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let [global_admin, data1, data2] = <[u32; 3]>::deserialize(deserializer)?;
        Ok(LargeCommunity::new(global_admin, [data1, data2]))
    }
}

impl Serialize for ExtendedCommunity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(1 + self.fields.len()))?;
        seq.serialize_element(&self.tag)?;
        for field in &self.fields {
            seq.serialize_element(field)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for ExtendedCommunity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match meta_from_raw::<D>(SmallVec::deserialize(deserializer)?)? {
            MetaCommunity::Extended(c) => Ok(c),
            other => Err(D::Error::custom(format!(
                "expected extended community, got {}",
                other
            ))),
        }
    }
}

impl Serialize for MetaCommunity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MetaCommunity::Plain(c) => c.serialize(serializer),
            MetaCommunity::Extended(c) => c.serialize(serializer),
            MetaCommunity::Large(c) => c.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for MetaCommunity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        meta_from_raw::<D>(SmallVec::deserialize(deserializer)?)
    }
}

fn meta_from_raw<'de, D: Deserializer<'de>>(
    raw: SmallVec<[RawField; 3]>,
) -> Result<MetaCommunity, D::Error> {
    let to_u32 = |v: u64| {
        u32::try_from(v).map_err(|_| D::Error::custom(format!("community field {} out of range", v)))
    };
    match raw.as_slice() {
        [RawField::Num(a), RawField::Num(b)] => {
            Ok(MetaCommunity::Plain(Community::new(to_u32(*a)?, to_u32(*b)?)))
        }
        [RawField::Num(a), RawField::Num(b), RawField::Num(c)] => Ok(MetaCommunity::Large(
            LargeCommunity::new(to_u32(*a)?, [to_u32(*b)?, to_u32(*c)?]),
        )),
        [RawField::Tag(tag), rest @ ..] if !rest.is_empty() && rest.len() <= 2 => {
            let fields = rest
                .iter()
                .map(|f| match f {
                    RawField::Num(v) => Ok(*v),
                    RawField::Tag(t) => Err(D::Error::custom(format!(
                        "non-numeric extended community value '{}'",
                        t
                    ))),
                })
                .collect::<Result<SmallVec<[u64; 2]>, _>>()?;
            Ok(MetaCommunity::Extended(ExtendedCommunity {
                tag: tag.clone(),
                fields,
            }))
        }
        fields => Err(D::Error::custom(format!(
            "invalid community array of {} fields",
            fields.len()
        ))),
    }
}
