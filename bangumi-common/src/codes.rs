//! Closed code domains used by the Bangumi archive
//!
//! Every raw code found in the dump converts into one of these enums through
//! `TryFrom`. The conversion is the only fallible step: once a value is an
//! enum, `label()` is total.
//!
//! | Domain | Raw type | Source field |
//! |--------|----------|--------------|
//! | [`Category`] | `u8` | `subject.type` |
//! | [`PersonType`] | `u8` | `person.type` |
//! | [`Career`] | `&str` | `person.career[]` |
//! | [`CharacterRole`] | `u8` | `character.role` |
//! | [`SubjectCharacterType`] | `u8` | `subject-characters.type` |

use crate::error::LookupError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Subject category (`subject.type`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Category {
    Book,
    Anime,
    Music,
    Game,
    Real,
}

impl Category {
    /// All categories in code order
    pub const ALL: [Category; 5] = [
        Category::Book,
        Category::Anime,
        Category::Music,
        Category::Game,
        Category::Real,
    ];

    /// Raw code as used by the archive (note: 5 is unused)
    pub fn code(self) -> u8 {
        match self {
            Category::Book => 1,
            Category::Anime => 2,
            Category::Music => 3,
            Category::Game => 4,
            Category::Real => 6,
        }
    }

    /// Display label
    pub fn label(self) -> &'static str {
        match self {
            Category::Book => "书籍",
            Category::Anime => "动画",
            Category::Music => "音乐",
            Category::Game => "游戏",
            Category::Real => "三次元",
        }
    }
}

impl TryFrom<u8> for Category {
    type Error = LookupError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Category::Book),
            2 => Ok(Category::Anime),
            3 => Ok(Category::Music),
            4 => Ok(Category::Game),
            6 => Ok(Category::Real),
            other => Err(LookupError::Category(other)),
        }
    }
}

impl From<Category> for u8 {
    fn from(category: Category) -> u8 {
        category.code()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Person type (`person.type`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PersonType {
    Individual,
    Company,
    Group,
}

impl PersonType {
    /// Convert a raw person type.
    ///
    /// `Ok(None)` for code 0: such persons are invalid in the archive and are
    /// dropped by the loader rather than treated as a lookup failure.
    pub fn from_code(code: u8) -> Result<Option<Self>, LookupError> {
        match code {
            0 => Ok(None),
            1 => Ok(Some(PersonType::Individual)),
            2 => Ok(Some(PersonType::Company)),
            3 => Ok(Some(PersonType::Group)),
            other => Err(LookupError::PersonType(other)),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PersonType::Individual => "个人",
            PersonType::Company => "公司",
            PersonType::Group => "组合",
        }
    }
}

/// Person career (`person.career[]`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Career {
    Producer,
    Writer,
    Actor,
    Illustrator,
    Seiyu,
    Mangaka,
    Artist,
}

impl Career {
    pub fn label(self) -> &'static str {
        match self {
            Career::Producer => "制作人员",
            Career::Writer => "作家",
            Career::Actor => "演员",
            Career::Illustrator => "绘师",
            Career::Seiyu => "声优",
            Career::Mangaka => "漫画家",
            Career::Artist => "音乐人",
        }
    }
}

impl TryFrom<&str> for Career {
    type Error = LookupError;

    fn try_from(code: &str) -> Result<Self, Self::Error> {
        match code {
            "producer" => Ok(Career::Producer),
            "writer" => Ok(Career::Writer),
            "actor" => Ok(Career::Actor),
            "illustrator" => Ok(Career::Illustrator),
            "seiyu" => Ok(Career::Seiyu),
            "mangaka" => Ok(Career::Mangaka),
            "artist" => Ok(Career::Artist),
            other => Err(LookupError::Career(other.to_string())),
        }
    }
}

/// Character role (`character.role`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharacterRole {
    Character,
    Mecha,
    Organization,
    Unknown,
}

impl CharacterRole {
    pub fn label(self) -> &'static str {
        match self {
            CharacterRole::Character => "角色",
            CharacterRole::Mecha => "机体",
            CharacterRole::Organization => "组织",
            CharacterRole::Unknown => "未知",
        }
    }
}

impl TryFrom<u8> for CharacterRole {
    type Error = LookupError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(CharacterRole::Character),
            2 => Ok(CharacterRole::Mecha),
            3 => Ok(CharacterRole::Organization),
            4 => Ok(CharacterRole::Unknown),
            other => Err(LookupError::CharacterRole(other)),
        }
    }
}

/// Appearance type of a character in a subject (`subject-characters.type`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubjectCharacterType {
    Main,
    Supporting,
    Guest,
}

impl SubjectCharacterType {
    pub fn label(self) -> &'static str {
        match self {
            SubjectCharacterType::Main => "主角",
            SubjectCharacterType::Supporting => "配角",
            SubjectCharacterType::Guest => "客串",
        }
    }
}

impl TryFrom<u8> for SubjectCharacterType {
    type Error = LookupError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(SubjectCharacterType::Main),
            2 => Ok(SubjectCharacterType::Supporting),
            3 => Ok(SubjectCharacterType::Guest),
            other => Err(LookupError::SubjectCharacterType(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_round_trip_and_labels() {
        for category in Category::ALL {
            assert_eq!(Category::try_from(category.code()).unwrap(), category);
        }
        assert_eq!(Category::Anime.label(), "动画");
        assert_eq!(Category::Real.code(), 6);
    }

    #[test]
    fn test_category_rejects_unused_code() {
        assert_eq!(Category::try_from(5), Err(LookupError::Category(5)));
        assert_eq!(Category::try_from(0), Err(LookupError::Category(0)));
    }

    #[test]
    fn test_person_type_zero_is_invalid_not_error() {
        assert_eq!(PersonType::from_code(0), Ok(None));
        assert_eq!(PersonType::from_code(2), Ok(Some(PersonType::Company)));
        assert_eq!(PersonType::from_code(9), Err(LookupError::PersonType(9)));
    }

    #[test]
    fn test_career_codes() {
        assert_eq!(Career::try_from("seiyu").unwrap().label(), "声优");
        assert_eq!(
            Career::try_from("dancer"),
            Err(LookupError::Career("dancer".to_string()))
        );
    }

    #[test]
    fn test_character_codes() {
        assert_eq!(CharacterRole::try_from(2).unwrap().label(), "机体");
        assert!(CharacterRole::try_from(5).is_err());
        assert_eq!(SubjectCharacterType::try_from(1).unwrap().label(), "主角");
        assert!(SubjectCharacterType::try_from(0).is_err());
    }

    #[test]
    fn test_category_serde_uses_raw_code() {
        let category: Category = serde_json::from_str("4").unwrap();
        assert_eq!(category, Category::Game);
        assert_eq!(serde_json::to_string(&Category::Book).unwrap(), "1");
        assert!(serde_json::from_str::<Category>("7").is_err());
    }
}
