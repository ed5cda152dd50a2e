use crate::types::{Task, TaskCategory, ValueKind};

/// The catalog seeded on first access to an empty store.
pub fn default_tasks() -> Vec<Task> {
    use TaskCategory::*;

    vec![
        Task::new("task1", "VISUALIZATION - MORNING", Morning),
        Task::new("task2", "SMILE AT THE MIRROR", Morning),
        Task::new("task3", "READING NEWSPAPER", Productivity),
        Task::new("task4", "PODCAST/ CURRENT TREND NEWS", SelfDevelopment),
        Task::new("task5", "PROFESSIONAL FRIEND", SelfDevelopment),
        Task::new("task6", "ENGLISH SONG", SelfDevelopment),
        Task::new("task7", "READING BOOK", SelfDevelopment),
        Task::new("task8", "ENGLISH COMMUNICATION", SelfDevelopment),
        Task::new("task9", "ACHIEVEMENTS", Productivity),
        Task::new("task10", "EXERCISE", Wellness),
        Task::new("task11", "GRATITUDE JOURNAL", Wellness),
        Task::new("task12", "PHONE- OFF (9pm - 6am)", Evening),
        Task::new("task13", "WAKE UP BEFORE 6 AM", Morning),
        Task::new("task14", "VISUALIZATION - NIGHT", Evening),
        Task::new("task15", "SCREEN TIME", Productivity).with_value_kind(ValueKind::Duration),
    ]
}
