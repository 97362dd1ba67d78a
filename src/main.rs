fn main() {
    std::process::exit(chess_engine::uci::run());
}
