//! The default multi-year roadmap every profile is seeded with.
//!
//! Ids are stable storage keys: existing ids must never be renamed, and new
//! items only ever get appended. Logins merge newly added ids into stored
//! roadmaps.

use crate::models::roadmap::{Category, Priority, RoadmapItem, Role, Status};

struct Seed {
    id: &'static str,
    year: u8,
    name: &'static str,
    description: &'static str,
    category: Category,
    priority: Priority,
    roles: &'static [Role],
    resource: Option<(&'static str, &'static str)>,
    is_project: bool,
    is_output: bool,
    time_estimate: Option<&'static str>,
}

const ALL: &[Role] = &[Role::AllRoles];
const SDE: &[Role] = &[Role::Sde];
const ML: &[Role] = &[Role::MlEngineer, Role::DataScientist];
const SDE_ML: &[Role] = &[Role::Sde, Role::MlEngineer];
const DS: &[Role] = &[Role::DataScientist];

const SEEDS: &[Seed] = &[
    Seed {
        id: "y0-python-basics",
        year: 0,
        name: "Python Fundamentals",
        description: "Syntax, control flow, functions, lists and dictionaries.",
        category: Category::Foundations,
        priority: Priority::High,
        roles: ALL,
        resource: Some(("CS50P", "https://cs50.harvard.edu/python/")),
        is_project: false,
        is_output: false,
        time_estimate: Some("4 weeks"),
    },
    Seed {
        id: "y0-git-basics",
        year: 0,
        name: "Git & GitHub",
        description: "Commits, branches, pull requests and a public profile README.",
        category: Category::Development,
        priority: Priority::Medium,
        roles: ALL,
        resource: Some(("Pro Git", "https://git-scm.com/book/en/v2")),
        is_project: false,
        is_output: false,
        time_estimate: Some("1 week"),
    },
    Seed {
        id: "y0-math-refresh",
        year: 0,
        name: "School Math Refresh",
        description: "Functions, basic probability, and comfort with algebraic manipulation.",
        category: Category::Mathematics,
        priority: Priority::Low,
        roles: ML,
        resource: Some(("Khan Academy", "https://www.khanacademy.org/math")),
        is_project: false,
        is_output: false,
        time_estimate: Some("3 weeks"),
    },
    Seed {
        id: "y1-c-programming",
        year: 1,
        name: "C Programming",
        description: "Pointers, memory layout, structs and manual allocation.",
        category: Category::Foundations,
        priority: Priority::High,
        roles: SDE,
        resource: Some(("K&R", "https://en.wikipedia.org/wiki/The_C_Programming_Language")),
        is_project: false,
        is_output: false,
        time_estimate: Some("6 weeks"),
    },
    Seed {
        id: "y1-dsa-arrays",
        year: 1,
        name: "Arrays, Strings & Hashing",
        description: "Two pointers, sliding window, prefix sums and hash maps.",
        category: Category::DataStructures,
        priority: Priority::High,
        roles: ALL,
        resource: Some(("NeetCode", "https://neetcode.io/roadmap")),
        is_project: false,
        is_output: false,
        time_estimate: Some("4 weeks"),
    },
    Seed {
        id: "y1-discrete-math",
        year: 1,
        name: "Discrete Mathematics",
        description: "Logic, sets, relations, combinatorics and proof techniques.",
        category: Category::Mathematics,
        priority: Priority::Medium,
        roles: ALL,
        resource: None,
        is_project: false,
        is_output: false,
        time_estimate: Some("1 semester"),
    },
    Seed {
        id: "y1-web-basics",
        year: 1,
        name: "HTML, CSS & JavaScript",
        description: "Build and deploy a static personal portfolio site.",
        category: Category::Development,
        priority: Priority::Medium,
        roles: SDE,
        resource: Some(("MDN", "https://developer.mozilla.org/en-US/docs/Learn")),
        is_project: true,
        is_output: false,
        time_estimate: Some("3 weeks"),
    },
    Seed {
        id: "y1-linkedin",
        year: 1,
        name: "LinkedIn Profile",
        description: "Headline, about section and first connections with seniors.",
        category: Category::Career,
        priority: Priority::Low,
        roles: ALL,
        resource: None,
        is_project: false,
        is_output: true,
        time_estimate: Some("2 days"),
    },
    Seed {
        id: "y2-dsa-trees-graphs",
        year: 2,
        name: "Trees & Graphs",
        description: "BFS, DFS, shortest paths, topological sort and union-find.",
        category: Category::DataStructures,
        priority: Priority::High,
        roles: ALL,
        resource: Some(("NeetCode", "https://neetcode.io/roadmap")),
        is_project: false,
        is_output: false,
        time_estimate: Some("6 weeks"),
    },
    Seed {
        id: "y2-dynamic-programming",
        year: 2,
        name: "Dynamic Programming",
        description: "Memoization, tabulation, knapsack and interval DP patterns.",
        category: Category::DataStructures,
        priority: Priority::High,
        roles: SDE_ML,
        resource: None,
        is_project: false,
        is_output: false,
        time_estimate: Some("5 weeks"),
    },
    Seed {
        id: "y2-oop-java",
        year: 2,
        name: "Object-Oriented Programming",
        description: "Classes, interfaces, inheritance and SOLID in Java.",
        category: Category::Foundations,
        priority: Priority::Medium,
        roles: SDE,
        resource: None,
        is_project: false,
        is_output: false,
        time_estimate: Some("1 semester"),
    },
    Seed {
        id: "y2-linear-algebra",
        year: 2,
        name: "Linear Algebra",
        description: "Vectors, matrices, eigenvalues and SVD with geometric intuition.",
        category: Category::Mathematics,
        priority: Priority::High,
        roles: ML,
        resource: Some((
            "3Blue1Brown",
            "https://www.3blue1brown.com/topics/linear-algebra",
        )),
        is_project: false,
        is_output: false,
        time_estimate: Some("6 weeks"),
    },
    Seed {
        id: "y2-fullstack-project",
        year: 2,
        name: "Full-Stack CRUD App",
        description: "Frontend, REST backend and a relational database, deployed.",
        category: Category::Development,
        priority: Priority::High,
        roles: SDE,
        resource: None,
        is_project: true,
        is_output: true,
        time_estimate: Some("6 weeks"),
    },
    Seed {
        id: "y2-hackathon",
        year: 2,
        name: "First Hackathon",
        description: "Ship something end to end in a weekend with a team.",
        category: Category::SoftSkills,
        priority: Priority::Low,
        roles: ALL,
        resource: None,
        is_project: true,
        is_output: true,
        time_estimate: Some("1 weekend"),
    },
    Seed {
        id: "y3-operating-systems",
        year: 3,
        name: "Operating Systems",
        description: "Processes, scheduling, virtual memory, concurrency primitives.",
        category: Category::Foundations,
        priority: Priority::High,
        roles: SDE,
        resource: Some(("OSTEP", "https://pages.cs.wisc.edu/~remzi/OSTEP/")),
        is_project: false,
        is_output: false,
        time_estimate: Some("1 semester"),
    },
    Seed {
        id: "y3-dbms",
        year: 3,
        name: "Database Systems",
        description: "Normalization, indexing, transactions and query planning.",
        category: Category::Foundations,
        priority: Priority::Medium,
        roles: ALL,
        resource: None,
        is_project: false,
        is_output: false,
        time_estimate: Some("1 semester"),
    },
    Seed {
        id: "y3-ml-foundations",
        year: 3,
        name: "Machine Learning Foundations",
        description: "Regression, classification, bias-variance and evaluation metrics.",
        category: Category::MachineLearning,
        priority: Priority::High,
        roles: ML,
        resource: Some((
            "Andrew Ng ML Specialization",
            "https://www.coursera.org/specializations/machine-learning-introduction",
        )),
        is_project: false,
        is_output: false,
        time_estimate: Some("8 weeks"),
    },
    Seed {
        id: "y3-statistics",
        year: 3,
        name: "Statistics & Experimentation",
        description: "Hypothesis testing, confidence intervals and A/B test design.",
        category: Category::Mathematics,
        priority: Priority::Medium,
        roles: DS,
        resource: None,
        is_project: false,
        is_output: false,
        time_estimate: Some("5 weeks"),
    },
    Seed {
        id: "y3-ml-project",
        year: 3,
        name: "End-to-End ML Project",
        description: "Data collection, model training, evaluation and a served demo.",
        category: Category::MachineLearning,
        priority: Priority::High,
        roles: ML,
        resource: None,
        is_project: true,
        is_output: true,
        time_estimate: Some("6 weeks"),
    },
    Seed {
        id: "y3-internship-prep",
        year: 3,
        name: "Internship Applications",
        description: "One-page resume, referrals and a tracked application pipeline.",
        category: Category::Career,
        priority: Priority::High,
        roles: ALL,
        resource: None,
        is_project: false,
        is_output: true,
        time_estimate: Some("ongoing"),
    },
    Seed {
        id: "y4-system-design",
        year: 4,
        name: "System Design Basics",
        description: "Load balancing, caching, sharding, queues and consistency trade-offs.",
        category: Category::SystemDesign,
        priority: Priority::High,
        roles: SDE,
        resource: Some((
            "System Design Primer",
            "https://github.com/donnemartin/system-design-primer",
        )),
        is_project: false,
        is_output: false,
        time_estimate: Some("6 weeks"),
    },
    Seed {
        id: "y4-deep-learning",
        year: 4,
        name: "Deep Learning",
        description: "Backpropagation, CNNs, transformers and fine-tuning in PyTorch.",
        category: Category::MachineLearning,
        priority: Priority::Medium,
        roles: ML,
        resource: Some(("d2l.ai", "https://d2l.ai/")),
        is_project: false,
        is_output: false,
        time_estimate: Some("8 weeks"),
    },
    Seed {
        id: "y4-capstone",
        year: 4,
        name: "Capstone Project",
        description: "A substantial project with real users or a written report.",
        category: Category::Development,
        priority: Priority::High,
        roles: ALL,
        resource: None,
        is_project: true,
        is_output: true,
        time_estimate: Some("1 semester"),
    },
    Seed {
        id: "y4-mock-interviews",
        year: 4,
        name: "Mock Interviews",
        description: "Timed coding rounds and behavioural answers in STAR format.",
        category: Category::SoftSkills,
        priority: Priority::Medium,
        roles: ALL,
        resource: None,
        is_project: false,
        is_output: false,
        time_estimate: Some("ongoing"),
    },
    Seed {
        id: "y4-open-source",
        year: 4,
        name: "Open Source Contribution",
        description: "Land at least one merged pull request in a maintained project.",
        category: Category::Development,
        priority: Priority::Low,
        roles: SDE_ML,
        resource: None,
        is_project: true,
        is_output: true,
        time_estimate: Some("4 weeks"),
    },
];

/// Builds the full default roadmap with every item in `To Do`.
pub fn roadmap_catalog() -> Vec<RoadmapItem> {
    SEEDS.iter().map(to_item).collect()
}

fn to_item(seed: &Seed) -> RoadmapItem {
    RoadmapItem {
        id: seed.id.to_string(),
        year: seed.year,
        name: seed.name.to_string(),
        description: seed.description.to_string(),
        category: seed.category,
        priority: seed.priority,
        status: Status::ToDo,
        role_alignment: seed.roles.to_vec(),
        resource_name: seed.resource.map(|(name, _)| name.to_string()),
        resource_link: seed.resource.map(|(_, link)| link.to_string()),
        is_project: seed.is_project,
        is_output: seed.is_output,
        time_estimate: seed.time_estimate.map(String::from),
    }
}
