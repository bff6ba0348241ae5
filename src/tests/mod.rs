mod spsc;
