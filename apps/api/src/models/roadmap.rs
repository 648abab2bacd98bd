use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Foundations,
    #[serde(rename = "Data Structures & Algorithms")]
    DataStructures,
    Development,
    #[serde(rename = "AI/ML")]
    MachineLearning,
    Mathematics,
    #[serde(rename = "System Design")]
    SystemDesign,
    Career,
    #[serde(rename = "Soft Skills")]
    SoftSkills,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Foundations,
        Category::DataStructures,
        Category::Development,
        Category::MachineLearning,
        Category::Mathematics,
        Category::SystemDesign,
        Category::Career,
        Category::SoftSkills,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Star points and XP granted the first time an item of this priority is completed.
    pub fn completion_reward(self) -> u32 {
        match self {
            Priority::High => 30,
            Priority::Medium => 20,
            Priority::Low => 10,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    #[default]
    #[serde(rename = "To Do")]
    ToDo,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
    Revisit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "SDE")]
    Sde,
    #[serde(rename = "ML Engineer")]
    MlEngineer,
    #[serde(rename = "Data Scientist")]
    DataScientist,
    #[serde(rename = "All Roles")]
    AllRoles,
}

impl Role {
    pub fn label(self) -> &'static str {
        match self {
            Role::Sde => "SDE",
            Role::MlEngineer => "ML Engineer",
            Role::DataScientist => "Data Scientist",
            Role::AllRoles => "All Roles",
        }
    }
}

/// A unit of learning or task content on the multi-year roadmap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapItem {
    pub id: String,
    /// 0 is the pre-university bridge year, 1-4 are degree years.
    pub year: u8,
    pub name: String,
    pub description: String,
    pub category: Category,
    pub priority: Priority,
    #[serde(default)]
    pub status: Status,
    pub role_alignment: Vec<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_link: Option<String>,
    #[serde(default)]
    pub is_project: bool,
    #[serde(default)]
    pub is_output: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_estimate: Option<String>,
}

impl RoadmapItem {
    /// True when the item counts towards the given role's progress.
    /// Items tagged "All Roles" count for every role.
    pub fn aligns_with(&self, role: Role) -> bool {
        self.role_alignment
            .iter()
            .any(|r| *r == role || *r == Role::AllRoles)
    }

    pub fn is_completed(&self) -> bool {
        self.status == Status::Completed
    }
}
