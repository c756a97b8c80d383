mod context_tests;
