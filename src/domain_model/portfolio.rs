use crate::domain_model::*;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    pub name: String,
    pub job_title: String,
    pub profile_picture: String,
    pub cover_photo: String,
    pub about_me: String,
    pub email: String,
    pub phone: String,
    pub location: String,
}

impl PersonalInfo {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name must not be empty".to_string());
        }
        if !self.email.contains('@') {
            return Err(format!("invalid email address: {}", self.email));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SocialLinks {
    pub linkedin: String,
    pub instagram: String,
    pub facebook: String,
    pub twitter: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ItemId>,
    pub company: String,
    pub position: String,
    pub start_date: String,
    pub end_date: String,
    pub is_current: bool,
    pub description: String,
    #[serde(default)]
    pub responsibilities: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certification {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ItemId>,
    pub name: String,
    pub issuing_org: String,
    pub issue_date: String,
    pub credential_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ItemId>,
    pub name: String,
    pub level: i64,
}

/// The single aggregate root served by the public API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioDocument {
    pub personal_info: PersonalInfo,
    #[serde(default)]
    pub experience: Vec<Experience>,
    #[serde(default)]
    pub certifications: Vec<Certification>,
    #[serde(default)]
    pub skills: Vec<Skill>,
    #[serde(default)]
    pub social_links: SocialLinks,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// An element of one of the three ordered lists, tagged by the list it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ListItem {
    Experience(Experience),
    Certification(Certification),
    Skill(Skill),
}

impl ListItem {
    pub fn list_name(&self) -> ListName {
        match self {
            ListItem::Experience(_) => ListName::Experience,
            ListItem::Certification(_) => ListName::Certifications,
            ListItem::Skill(_) => ListName::Skills,
        }
    }

    pub fn id(&self) -> Option<&ItemId> {
        match self {
            ListItem::Experience(e) => e.id(),
            ListItem::Certification(c) => c.id(),
            ListItem::Skill(s) => s.id(),
        }
    }

    /// Decode a request body for the given list.
    pub fn from_json(list: ListName, value: serde_json::Value) -> Result<Self, serde_json::Error> {
        Ok(match list {
            ListName::Experience => ListItem::Experience(serde_json::from_value(value)?),
            ListName::Certifications => ListItem::Certification(serde_json::from_value(value)?),
            ListName::Skills => ListItem::Skill(serde_json::from_value(value)?),
        })
    }
}

/// Common surface of list elements, used by the id-addressed list mutations.
pub trait Identified: Clone {
    fn id(&self) -> Option<&ItemId>;
    fn set_id(&mut self, id: ItemId);

    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

impl Identified for Experience {
    fn id(&self) -> Option<&ItemId> {
        self.id.as_ref()
    }

    fn set_id(&mut self, id: ItemId) {
        self.id = Some(id);
    }
}

impl Identified for Certification {
    fn id(&self) -> Option<&ItemId> {
        self.id.as_ref()
    }

    fn set_id(&mut self, id: ItemId) {
        self.id = Some(id);
    }
}

impl Identified for Skill {
    fn id(&self) -> Option<&ItemId> {
        self.id.as_ref()
    }

    fn set_id(&mut self, id: ItemId) {
        self.id = Some(id);
    }

    fn validate(&self) -> Result<(), String> {
        if !(0..=100).contains(&self.level) {
            return Err(format!("skill level must be within 0..=100, got {}", self.level));
        }
        Ok(())
    }
}

/// Why a list mutation did not apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListEditError {
    ItemNotFound,
    DuplicateId(ItemId),
    Invalid(String),
}

/// Append `item` to `list`, assigning a fresh id when the item carries none or a
/// blank one. A caller-supplied id must be usable as a path segment.
pub fn push_item<T: Identified>(list: &mut Vec<T>, mut item: T) -> Result<T, ListEditError> {
    item.validate().map_err(ListEditError::Invalid)?;
    if item.id().is_some_and(ItemId::is_blank) {
        item.set_id(ItemId::generate());
    }

    match item.id() {
        Some(id) if !id.is_addressable() => {
            return Err(ListEditError::Invalid(format!(
                "id {:?} may only contain letters, digits, '-', '_', '.' and '~'",
                id.as_str()
            )));
        }
        Some(id) if list.iter().any(|existing| existing.id() == Some(id)) => {
            return Err(ListEditError::DuplicateId(id.clone()));
        }
        Some(_) => {}
        None => item.set_id(ItemId::generate()),
    }

    list.push(item.clone());
    Ok(item)
}

/// Replace the element whose id is `id` in place. The stored id always wins over
/// whatever id the replacement carries.
pub fn replace_item<T: Identified>(
    list: &mut [T],
    id: &ItemId,
    mut item: T,
) -> Result<T, ListEditError> {
    item.validate().map_err(ListEditError::Invalid)?;

    let slot = list
        .iter_mut()
        .find(|existing| existing.id() == Some(id))
        .ok_or(ListEditError::ItemNotFound)?;

    item.set_id(id.clone());
    *slot = item.clone();
    Ok(item)
}

/// Remove the first element whose id is `id`.
pub fn remove_item<T: Identified>(list: &mut Vec<T>, id: &ItemId) -> Result<T, ListEditError> {
    let pos = list
        .iter()
        .position(|existing| existing.id() == Some(id))
        .ok_or(ListEditError::ItemNotFound)?;
    Ok(list.remove(pos))
}

impl PortfolioDocument {
    pub fn push(&mut self, item: ListItem) -> Result<ListItem, ListEditError> {
        Ok(match item {
            ListItem::Experience(e) => ListItem::Experience(push_item(&mut self.experience, e)?),
            ListItem::Certification(c) => {
                ListItem::Certification(push_item(&mut self.certifications, c)?)
            }
            ListItem::Skill(s) => ListItem::Skill(push_item(&mut self.skills, s)?),
        })
    }

    pub fn replace(&mut self, id: &ItemId, item: ListItem) -> Result<ListItem, ListEditError> {
        Ok(match item {
            ListItem::Experience(e) => {
                ListItem::Experience(replace_item(&mut self.experience, id, e)?)
            }
            ListItem::Certification(c) => {
                ListItem::Certification(replace_item(&mut self.certifications, id, c)?)
            }
            ListItem::Skill(s) => ListItem::Skill(replace_item(&mut self.skills, id, s)?),
        })
    }

    pub fn remove(&mut self, list: ListName, id: &ItemId) -> Result<ListItem, ListEditError> {
        Ok(match list {
            ListName::Experience => ListItem::Experience(remove_item(&mut self.experience, id)?),
            ListName::Certifications => {
                ListItem::Certification(remove_item(&mut self.certifications, id)?)
            }
            ListName::Skills => ListItem::Skill(remove_item(&mut self.skills, id)?),
        })
    }

    pub fn ids(&self, list: ListName) -> Vec<ItemId> {
        fn collect<T: Identified>(items: &[T]) -> Vec<ItemId> {
            items.iter().filter_map(|i| i.id().cloned()).collect()
        }
        match list {
            ListName::Experience => collect(&self.experience),
            ListName::Certifications => collect(&self.certifications),
            ListName::Skills => collect(&self.skills),
        }
    }
}
