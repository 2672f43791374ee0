pub mod toggl;
