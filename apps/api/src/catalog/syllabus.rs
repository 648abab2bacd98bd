use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Course {
    pub code: &'static str,
    pub title: &'static str,
    pub semester: u8,
    pub credits: u8,
    pub units: &'static [&'static str],
}

#[derive(Debug, Serialize)]
pub struct Elective {
    pub code: &'static str,
    pub title: &'static str,
    pub track: &'static str,
}

pub const COURSES: &[Course] = &[
    Course {
        code: "CS101",
        title: "Programming Fundamentals",
        semester: 1,
        credits: 4,
        units: &[
            "Variables, types and operators",
            "Control flow",
            "Functions and recursion",
            "Arrays and strings",
            "File handling",
        ],
    },
    Course {
        code: "MA101",
        title: "Engineering Mathematics I",
        semester: 1,
        credits: 4,
        units: &[
            "Differential calculus",
            "Integral calculus",
            "Sequences and series",
            "Matrices",
        ],
    },
    Course {
        code: "CS201",
        title: "Data Structures",
        semester: 3,
        credits: 4,
        units: &[
            "Linked lists",
            "Stacks and queues",
            "Trees and heaps",
            "Graphs",
            "Hashing",
        ],
    },
    Course {
        code: "CS202",
        title: "Discrete Structures",
        semester: 3,
        credits: 3,
        units: &[
            "Propositional logic",
            "Sets and relations",
            "Combinatorics",
            "Graph theory",
        ],
    },
    Course {
        code: "CS301",
        title: "Operating Systems",
        semester: 5,
        credits: 4,
        units: &[
            "Processes and threads",
            "CPU scheduling",
            "Synchronization",
            "Memory management",
            "File systems",
        ],
    },
    Course {
        code: "CS302",
        title: "Database Management Systems",
        semester: 5,
        credits: 4,
        units: &[
            "Relational model",
            "SQL",
            "Normalization",
            "Transactions and concurrency",
            "Indexing",
        ],
    },
    Course {
        code: "CS401",
        title: "Computer Networks",
        semester: 7,
        credits: 3,
        units: &[
            "Physical and data link layers",
            "Network layer and routing",
            "Transport layer",
            "Application layer protocols",
        ],
    },
];

pub const ELECTIVES: &[Elective] = &[
    Elective {
        code: "CSE511",
        title: "Machine Learning",
        track: "AI/ML",
    },
    Elective {
        code: "CSE512",
        title: "Natural Language Processing",
        track: "AI/ML",
    },
    Elective {
        code: "CSE521",
        title: "Distributed Systems",
        track: "Systems",
    },
    Elective {
        code: "CSE522",
        title: "Cloud Computing",
        track: "Systems",
    },
    Elective {
        code: "CSE531",
        title: "Data Mining",
        track: "Data Science",
    },
];

pub fn find_course(code: &str) -> Option<&'static Course> {
    COURSES.iter().find(|c| c.code.eq_ignore_ascii_case(code))
}
