pub mod comment_service;
pub mod comment_tree;
pub mod discussion_service;
pub mod reaction_service;
pub mod stance_tally;
