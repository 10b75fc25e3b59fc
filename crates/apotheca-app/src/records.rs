//! Remote record types
//!
//! Rows from the backend are deserialized into these types before they
//! reach callers. `New*` types are insert payloads: the record without the
//! fields the backend manages (`id`, `created_at`, `updated_at`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// =============================================================================
// Statuses
// =============================================================================

/// Review state of an uploaded prescription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrescriptionStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
}

impl PrescriptionStatus {
    /// Every status, in workflow order
    pub const ALL: [PrescriptionStatus; 4] = [
        PrescriptionStatus::Pending,
        PrescriptionStatus::Approved,
        PrescriptionStatus::Rejected,
        PrescriptionStatus::Completed,
    ];

    /// Column value stored by the backend
    pub fn as_str(&self) -> &'static str {
        match self {
            PrescriptionStatus::Pending => "pending",
            PrescriptionStatus::Approved => "approved",
            PrescriptionStatus::Rejected => "rejected",
            PrescriptionStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for PrescriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PrescriptionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown prescription status {s:?}"))
    }
}

/// Visibility of CMS content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

impl PublishStatus {
    /// Column value stored by the backend
    pub fn as_str(&self) -> &'static str {
        match self {
            PublishStatus::Draft => "draft",
            PublishStatus::Published => "published",
            PublishStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for PublishStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Prescriptions
// =============================================================================

/// A prescription uploaded by a customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prescription {
    pub id: Uuid,
    pub customer_name: String,
    pub customer_email: String,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub doctor_name: Option<String>,
    /// Scanned prescription in the storage bucket
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub status: PrescriptionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for [`Prescription`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPrescription {
    pub customer_name: String,
    pub customer_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub status: PrescriptionStatus,
}

impl NewPrescription {
    /// A pending prescription with contact details only
    pub fn new(customer_name: impl Into<String>, customer_email: impl Into<String>) -> Self {
        Self {
            customer_name: customer_name.into(),
            customer_email: customer_email.into(),
            customer_phone: None,
            doctor_name: None,
            image_url: None,
            notes: None,
            status: PrescriptionStatus::Pending,
        }
    }

    /// Attach the uploaded scan
    pub fn with_image(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }

    /// Set prescribing doctor
    pub fn with_doctor(mut self, doctor_name: impl Into<String>) -> Self {
        self.doctor_name = Some(doctor_name.into());
        self
    }
}

/// Prescription counts by status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrescriptionStats {
    pub total: u64,
    pub pending: u64,
    pub approved: u64,
    pub rejected: u64,
    pub completed: u64,
    /// Created within the recent window (last 24 hours)
    pub recent: u64,
}

impl PrescriptionStats {
    /// Mutable counter for one status
    pub fn count_mut(&mut self, status: PrescriptionStatus) -> &mut u64 {
        match status {
            PrescriptionStatus::Pending => &mut self.pending,
            PrescriptionStatus::Approved => &mut self.approved,
            PrescriptionStatus::Rejected => &mut self.rejected,
            PrescriptionStatus::Completed => &mut self.completed,
        }
    }
}

// =============================================================================
// CMS pages
// =============================================================================

/// A static content page (about, terms, FAQ)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CmsPage {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub meta_description: Option<String>,
    pub status: PublishStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for [`CmsPage`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCmsPage {
    pub slug: String,
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<String>,
    pub status: PublishStatus,
}

impl NewCmsPage {
    /// A draft page
    pub fn new(
        slug: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            slug: slug.into(),
            title: title.into(),
            content: content.into(),
            meta_description: None,
            status: PublishStatus::Draft,
        }
    }

    /// Set visibility
    pub fn with_status(mut self, status: PublishStatus) -> Self {
        self.status = status;
        self
    }

    /// Set the SEO description
    pub fn with_meta_description(mut self, description: impl Into<String>) -> Self {
        self.meta_description = Some(description.into());
        self
    }
}

// =============================================================================
// Blog posts
// =============================================================================

/// A health blog article
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogPost {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub cover_image_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub status: PublishStatus,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for [`BlogPost`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBlogPost {
    pub slug: String,
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    pub status: PublishStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
}

impl NewBlogPost {
    /// A draft post
    pub fn new(
        slug: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            slug: slug.into(),
            title: title.into(),
            content: content.into(),
            excerpt: None,
            author: None,
            cover_image_url: None,
            tags: Vec::new(),
            status: PublishStatus::Draft,
            published_at: None,
        }
    }

    /// Mark as published at `at`
    pub fn published_at(mut self, at: DateTime<Utc>) -> Self {
        self.status = PublishStatus::Published;
        self.published_at = Some(at);
        self
    }

    /// Set author
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Set tags
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}
