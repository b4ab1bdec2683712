mod diff_tests;
mod eval_tests;
mod parser_tests;
mod view_tests;
