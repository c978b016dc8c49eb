// Compatibility matching between professionals and job postings.
// The scorer is pure; repository and handlers wrap it for the HTTP surface.

pub mod handlers;
pub mod recommend;
pub mod repository;
pub mod scoring;

#[cfg(test)]
pub mod test_support;
