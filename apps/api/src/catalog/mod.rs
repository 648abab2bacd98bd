// Static data tables: roadmap, syllabus, shop, fixed daily tasks.
// No logic beyond construction and lookup lives here.

pub mod daily;
pub mod roadmap;
pub mod shop;
pub mod syllabus;
